use clap::Parser;
use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use cbnotify_core::ingest::provider::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use cbnotify_core::run::RunOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cbnotify_worker")]
struct Args {
    /// Target subscription date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// Send notifications even on a weekend with no subscriptions.
    #[arg(long)]
    notify_on_empty_weekend: bool,

    /// Where to write the run snapshot.
    #[arg(long, default_value = "bond_result.json")]
    output: PathBuf,

    /// Append the target date to the snapshot file name.
    #[arg(long)]
    dated_output: bool,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_NUMBER)]
    page_number: u32,

    /// Do everything except sending notifications.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = cbnotify_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, args).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "bond subscription run failed");
    }
    res
}

async fn run(settings: &cbnotify_core::config::Settings, args: Args) -> anyhow::Result<()> {
    let today = cbnotify_core::time::business_day::today(
        chrono::Utc::now(),
        settings.target_tz_offset_hours,
    )?;
    let target_date =
        cbnotify_core::time::business_day::resolve_target_date(args.date.as_deref(), today)?;

    let output_path = if args.dated_output {
        cbnotify_core::storage::snapshot::dated_path(&args.output, &target_date)
    } else {
        args.output
    };

    let source = cbnotify_core::ingest::provider::EastmoneyClient::from_settings(settings)?;
    let channels = cbnotify_core::notify::channels_from_settings(settings)
        .context("failed to build notification channels")?;

    let opts = RunOptions {
        target_date,
        page_size: args.page_size,
        page_number: args.page_number,
        skip_weekend_notification: !args.notify_on_empty_weekend,
        output_path,
        dry_run: args.dry_run,
    };

    let outcome = cbnotify_core::run::run_once(&source, &channels, &opts).await?;

    println!("{}", outcome.result.message);

    match &outcome.dispatch {
        Some(report) => tracing::info!(
            target_date = %outcome.result.date,
            count = outcome.result.count,
            succeeded = report.succeeded(),
            configured = report.configured(),
            failed = report.failed(),
            "run finished"
        ),
        None => tracing::info!(
            target_date = %outcome.result.date,
            count = outcome.result.count,
            "run finished without notifications"
        ),
    }

    Ok(())
}

fn init_sentry(settings: &cbnotify_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
