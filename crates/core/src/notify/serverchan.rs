use crate::config::Settings;
use crate::notify::{ensure_app_status_ok, webhook_http_client, ChannelKind, Notification, NotifyChannel};
use anyhow::{Context, Result};
use serde::Serialize;

const DEFAULT_BASE_URL: &str = "https://sctapi.ftqq.com";

/// ServerChan push relay, addressed by a per-user send key.
#[derive(Debug, Clone)]
pub struct ServerChanChannel {
    sendkey: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    title: &'a str,
    desp: &'a str,
}

impl ServerChanChannel {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.serverchan_sendkey.clone(),
            settings
                .serverchan_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )
    }

    pub fn new(sendkey: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            sendkey: sendkey.filter(|s| !s.trim().is_empty()),
            base_url: base_url.into(),
            http: webhook_http_client()?,
        })
    }

    fn url(&self, sendkey: &str) -> String {
        format!("{}/{}.send", self.base_url.trim_end_matches('/'), sendkey)
    }
}

#[async_trait::async_trait]
impl NotifyChannel for ServerChanChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::ServerChan
    }

    fn configured(&self) -> bool {
        self.sendkey.is_some()
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let sendkey = self
            .sendkey
            .as_deref()
            .context("SERVERCHAN_SENDKEY is not configured")?;

        let req = PushRequest {
            title: &notification.title,
            desp: &notification.body,
        };

        let res = self
            .http
            .post(self.url(sendkey))
            .json(&req)
            .send()
            .await
            .context("serverchan request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read serverchan response")?;
        if !status.is_success() {
            anyhow::bail!("serverchan HTTP {status}: {text}");
        }

        ensure_app_status_ok(&text, "code")
    }
}
