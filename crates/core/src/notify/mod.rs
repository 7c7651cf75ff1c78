pub mod email;
pub mod serverchan;
pub mod webhook;

use crate::config::Settings;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelKind {
    Email,
    DingTalk,
    WeChatWork,
    ServerChan,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::DingTalk => "dingtalk",
            ChannelKind::WeChatWork => "wechat_work",
            ChannelKind::ServerChan => "serverchan",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait NotifyChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Whether every setting the channel needs is present.
    fn configured(&self) -> bool;

    async fn send(&self, notification: &Notification) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    NotConfigured,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutcome {
    pub channel: ChannelKind,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub fn configured(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != DeliveryStatus::NotConfigured)
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DeliveryStatus::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Failed(_)))
            .count()
    }

    pub fn status_of(&self, channel: ChannelKind) -> Option<&DeliveryStatus> {
        self.outcomes
            .iter()
            .find(|o| o.channel == channel)
            .map(|o| &o.status)
    }

    /// Success flag per configured channel; unconfigured channels are left out.
    pub fn as_map(&self) -> BTreeMap<ChannelKind, bool> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                DeliveryStatus::Delivered => Some((o.channel, true)),
                DeliveryStatus::Failed(_) => Some((o.channel, false)),
                DeliveryStatus::NotConfigured => None,
            })
            .collect()
    }
}

/// Attempts each channel once, in order. A failing channel never stops the others.
pub async fn dispatch(
    notification: &Notification,
    channels: &[Box<dyn NotifyChannel>],
) -> DispatchReport {
    let mut outcomes = Vec::with_capacity(channels.len());

    for channel in channels {
        let kind = channel.kind();
        let status = if !channel.configured() {
            tracing::info!(channel = %kind, "channel not configured; skipping");
            DeliveryStatus::NotConfigured
        } else {
            match channel.send(notification).await {
                Ok(()) => {
                    tracing::info!(channel = %kind, "notification delivered");
                    DeliveryStatus::Delivered
                }
                Err(err) => {
                    tracing::warn!(channel = %kind, error = %format!("{err:#}"), "notification delivery failed");
                    DeliveryStatus::Failed(format!("{err:#}"))
                }
            }
        };
        outcomes.push(ChannelOutcome {
            channel: kind,
            status,
        });
    }

    let report = DispatchReport { outcomes };
    tracing::info!(
        succeeded = report.succeeded(),
        configured = report.configured(),
        "{} of {} configured channels succeeded",
        report.succeeded(),
        report.configured()
    );
    report
}

/// Every supported channel, configured or not, in delivery order.
pub fn channels_from_settings(settings: &Settings) -> Result<Vec<Box<dyn NotifyChannel>>> {
    Ok(vec![
        Box::new(email::EmailChannel::from_settings(settings)),
        Box::new(webhook::WebhookChannel::new(
            ChannelKind::DingTalk,
            settings.dingtalk_webhook.clone(),
        )?),
        Box::new(webhook::WebhookChannel::new(
            ChannelKind::WeChatWork,
            settings.wechat_work_webhook.clone(),
        )?),
        Box::new(serverchan::ServerChanChannel::from_settings(settings)?),
    ])
}

pub(crate) fn webhook_http_client() -> Result<reqwest::Client> {
    use anyhow::Context;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
        .build()
        .context("failed to build webhook http client")
}

/// Chat webhooks and the push relay answer HTTP 200 with an application status code.
pub(crate) fn ensure_app_status_ok(body: &str, field: &str) -> Result<()> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get(field).and_then(serde_json::Value::as_i64) {
        Some(0) | None => Ok(()),
        Some(code) => {
            let msg = value
                .get("errmsg")
                .or_else(|| value.get("message"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("");
            anyhow::bail!("remote rejected message ({field}={code}): {msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubChannel {
        kind: ChannelKind,
        configured: bool,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl NotifyChannel for StubChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        fn configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, _notification: &Notification) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("stub failure");
            }
            Ok(())
        }
    }

    fn stub(kind: ChannelKind, configured: bool, fail: bool, calls: &Arc<AtomicUsize>) -> Box<dyn NotifyChannel> {
        Box::new(StubChannel {
            kind,
            configured,
            fail,
            calls: Arc::clone(calls),
        })
    }

    fn notification() -> Notification {
        Notification {
            title: "可转债申购提醒 - 2026-01-16".to_string(),
            body: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn failing_channel_does_not_affect_others() {
        let calls = Arc::new(AtomicUsize::new(0));
        let channels = vec![
            stub(ChannelKind::DingTalk, true, true, &calls),
            stub(ChannelKind::WeChatWork, true, false, &calls),
        ];

        let report = dispatch(&notification(), &channels).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(
            report.status_of(ChannelKind::DingTalk),
            Some(DeliveryStatus::Failed(msg)) if msg.contains("stub failure")
        ));
        assert_eq!(report.status_of(ChannelKind::WeChatWork), Some(&DeliveryStatus::Delivered));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn unconfigured_channels_are_skipped_not_failed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let channels = vec![
            stub(ChannelKind::Email, false, true, &calls),
            stub(ChannelKind::ServerChan, true, false, &calls),
        ];

        let report = dispatch(&notification(), &channels).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.status_of(ChannelKind::Email), Some(&DeliveryStatus::NotConfigured));
        assert_eq!(report.configured(), 1);
        assert_eq!(report.failed(), 0);

        let map = report.as_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&ChannelKind::ServerChan), Some(&true));
    }

    #[test]
    fn channels_from_empty_settings_are_all_unconfigured() {
        let channels = channels_from_settings(&Settings::default()).unwrap();
        let kinds: Vec<_> = channels.iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ChannelKind::Email,
                ChannelKind::DingTalk,
                ChannelKind::WeChatWork,
                ChannelKind::ServerChan
            ]
        );
        assert!(channels.iter().all(|c| !c.configured()));
    }

    #[test]
    fn app_status_check() {
        assert!(ensure_app_status_ok(r#"{"errcode":0,"errmsg":"ok"}"#, "errcode").is_ok());
        assert!(ensure_app_status_ok("ok", "errcode").is_ok());
        assert!(ensure_app_status_ok(r#"{"data":{}}"#, "code").is_ok());

        let err = ensure_app_status_ok(r#"{"errcode":310000,"errmsg":"keywords not in content"}"#, "errcode")
            .unwrap_err();
        assert!(err.to_string().contains("310000"));
        assert!(err.to_string().contains("keywords not in content"));
    }
}
