pub mod domain;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod run;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub smtp_host: Option<String>,
        pub smtp_port: Option<u16>,
        pub sender_email: Option<String>,
        pub sender_password: Option<String>,
        pub receiver_email: Option<String>,
        pub dingtalk_webhook: Option<String>,
        pub wechat_work_webhook: Option<String>,
        pub serverchan_sendkey: Option<String>,
        pub serverchan_base_url: Option<String>,
        pub eastmoney_base_url: Option<String>,
        pub eastmoney_timeout_secs: Option<u64>,
        pub target_tz_offset_hours: Option<i32>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                smtp_host: var("SMTP_HOST"),
                smtp_port: parse_var("SMTP_PORT")?,
                sender_email: var("SENDER_EMAIL"),
                sender_password: var("SENDER_PASSWORD"),
                receiver_email: var("RECEIVER_EMAIL"),
                dingtalk_webhook: var("DINGTALK_WEBHOOK"),
                wechat_work_webhook: var("WECHAT_WORK_WEBHOOK"),
                serverchan_sendkey: var("SERVERCHAN_SENDKEY"),
                serverchan_base_url: var("SERVERCHAN_BASE_URL"),
                eastmoney_base_url: var("EASTMONEY_BASE_URL"),
                eastmoney_timeout_secs: parse_var("EASTMONEY_TIMEOUT_SECS")?,
                target_tz_offset_hours: parse_var("TARGET_TZ_OFFSET_HOURS")?,
                sentry_dsn: var("SENTRY_DSN"),
            })
        }

        pub fn smtp_host(&self) -> &str {
            self.smtp_host.as_deref().unwrap_or(DEFAULT_SMTP_HOST)
        }

        pub fn smtp_port(&self) -> u16 {
            self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
        }
    }

    // Blank values are treated the same as unset ones.
    fn var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        var(key)
            .map(|s| s.parse::<T>().with_context(|| format!("{key} is invalid: {s:?}")))
            .transpose()
    }
}
