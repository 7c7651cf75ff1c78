use crate::notify::{ensure_app_status_ok, webhook_http_client, ChannelKind, Notification, NotifyChannel};
use anyhow::{Context, Result};
use serde::Serialize;

/// Team-chat robot webhook (DingTalk, WeChat Work) taking a plain text message.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    kind: ChannelKind,
    url: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msgtype: &'static str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

impl WebhookChannel {
    pub fn new(kind: ChannelKind, url: Option<String>) -> Result<Self> {
        Ok(Self {
            kind,
            url: url.filter(|s| !s.trim().is_empty()),
            http: webhook_http_client()?,
        })
    }
}

#[async_trait::async_trait]
impl NotifyChannel for WebhookChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn configured(&self) -> bool {
        self.url.is_some()
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let url = self
            .url
            .as_deref()
            .with_context(|| format!("{} webhook url is not configured", self.kind))?;

        let payload = TextMessage {
            msgtype: "text",
            text: TextContent {
                content: &notification.body,
            },
        };

        let res = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} webhook request failed", self.kind))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read {} webhook response", self.kind))?;
        if !status.is_success() {
            anyhow::bail!("{} webhook HTTP {status}: {text}", self.kind);
        }

        ensure_app_status_ok(&text, "errcode")
    }
}
