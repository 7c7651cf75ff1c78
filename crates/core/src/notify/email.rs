use crate::config::Settings;
use crate::notify::{ChannelKind, Notification, NotifyChannel};
use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT_SECS: u64 = 60;

/// Plain-text mail over SMTP submission with STARTTLS.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    host: String,
    port: u16,
    sender: Option<String>,
    password: Option<String>,
    receiver: Option<String>,
}

impl EmailChannel {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            host: settings.smtp_host().to_string(),
            port: settings.smtp_port(),
            sender: settings.sender_email.clone(),
            password: settings.sender_password.clone(),
            receiver: settings.receiver_email.clone(),
        }
    }

    fn build_message(&self, notification: &Notification) -> Result<Message> {
        let sender = self.sender.as_deref().context("SENDER_EMAIL is required")?;
        let receiver = self
            .receiver
            .as_deref()
            .context("RECEIVER_EMAIL is required")?;

        let from: Mailbox = sender
            .parse()
            .with_context(|| format!("invalid SENDER_EMAIL: {sender}"))?;
        let to: Mailbox = receiver
            .parse()
            .with_context(|| format!("invalid RECEIVER_EMAIL: {receiver}"))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.title.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .context("failed to build email message")
    }
}

#[async_trait::async_trait]
impl NotifyChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn configured(&self) -> bool {
        self.sender.is_some() && self.password.is_some() && self.receiver.is_some()
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;
        let sender = self.sender.clone().context("SENDER_EMAIL is required")?;
        let password = self
            .password
            .clone()
            .context("SENDER_PASSWORD is required")?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .with_context(|| format!("invalid SMTP host: {}", self.host))?
            .port(self.port)
            .credentials(Credentials::new(sender, password))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build();

        mailer
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery via {}:{} failed", self.host, self.port))?;
        Ok(())
    }
}
