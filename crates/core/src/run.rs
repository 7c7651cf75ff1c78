use crate::domain::message::{format_message, notification_title};
use crate::domain::run_result::RunResult;
use crate::ingest::filter::filter_by_date;
use crate::ingest::provider::{ListingSource, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::notify::{dispatch, DispatchReport, Notification, NotifyChannel};
use crate::storage::snapshot::persist_run_result;
use crate::time::business_day::is_business_day;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    Init,
    Fetched,
    Filtered,
    Formatted,
    Persisted,
    Notified,
    Skipped,
    Done,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Already resolved `YYYY-MM-DD`.
    pub target_date: String,
    pub page_size: u32,
    pub page_number: u32,
    /// Suppress dispatch on a non-business day with no listings.
    pub skip_weekend_notification: bool,
    pub output_path: PathBuf,
    /// Run through persistence but never dispatch.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(target_date: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            target_date: target_date.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page_number: DEFAULT_PAGE_NUMBER,
            skip_weekend_notification: true,
            output_path: output_path.into(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: RunResult,
    pub output_path: PathBuf,
    /// `None` when dispatch was skipped.
    pub dispatch: Option<DispatchReport>,
    pub stages: Vec<RunStage>,
}

impl RunOutcome {
    pub fn notified(&self) -> bool {
        self.dispatch.is_some()
    }
}

/// Dispatch is suppressed only for an empty non-business day with suppression enabled.
pub fn should_notify(is_business_day: bool, count: usize, skip_weekend_notification: bool) -> bool {
    !(skip_weekend_notification && !is_business_day && count == 0)
}

/// One fetch-filter-format-persist-notify pass. Any error before dispatch aborts the run.
pub async fn run_once(
    source: &dyn ListingSource,
    channels: &[Box<dyn NotifyChannel>],
    opts: &RunOptions,
) -> anyhow::Result<RunOutcome> {
    let target_date = opts.target_date.as_str();
    let business_day = is_business_day(target_date)?;
    let mut stages = vec![RunStage::Init];

    tracing::info!(
        %target_date,
        is_business_day = business_day,
        source = source.source_name(),
        "scanning convertible bond subscriptions"
    );
    if !business_day {
        tracing::info!(%target_date, "target date is a weekend; checking anyway");
    }

    let fetched = source
        .fetch_listings(opts.page_size, opts.page_number)
        .await
        .context("fetch listings failed")?;
    advance(&mut stages, RunStage::Fetched, target_date);
    tracing::info!(%target_date, fetched = fetched.len(), "listing page fetched");

    let listings = filter_by_date(&fetched, target_date);
    advance(&mut stages, RunStage::Filtered, target_date);
    tracing::info!(%target_date, count = listings.len(), "listings matched target date");

    let message = format_message(&listings, target_date);
    advance(&mut stages, RunStage::Formatted, target_date);

    let result = RunResult::new(opts.target_date.clone(), listings, message, business_day);
    persist_run_result(&opts.output_path, &result)?;
    advance(&mut stages, RunStage::Persisted, target_date);
    tracing::info!(
        %target_date,
        path = %opts.output_path.display(),
        "run result persisted"
    );

    let dispatch_report = if opts.dry_run {
        tracing::info!(%target_date, message = %result.message, "dry run; notification not sent");
        advance(&mut stages, RunStage::Skipped, target_date);
        None
    } else if !should_notify(business_day, result.count, opts.skip_weekend_notification) {
        tracing::info!(%target_date, "weekend with no subscriptions; skipping notification");
        advance(&mut stages, RunStage::Skipped, target_date);
        None
    } else {
        let notification = Notification {
            title: notification_title(target_date),
            body: result.message.clone(),
        };
        let report = dispatch(&notification, channels).await;
        advance(&mut stages, RunStage::Notified, target_date);
        Some(report)
    };

    advance(&mut stages, RunStage::Done, target_date);
    tracing::info!(%target_date, count = result.count, "scan complete");

    Ok(RunOutcome {
        result,
        output_path: opts.output_path.clone(),
        dispatch: dispatch_report,
        stages,
    })
}

fn advance(stages: &mut Vec<RunStage>, next: RunStage, target_date: &str) {
    debug_assert!(stages.last().is_some_and(|cur| *cur < next));
    tracing::debug!(%target_date, stage = ?next, "run stage");
    stages.push(next);
}
