//! Contact message notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use site_core::{Error, Result, ValidatedContact};
use std::time::Duration;
use tracing::{info, warn};

/// Contact message forwarded to the site owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNotification {
    pub name: String,
    pub email: String,
    pub message: String,
    pub client_ip: Option<String>,
    /// Bot-verification token from the form, untouched.
    pub verification_token: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl ContactNotification {
    pub fn new(contact: ValidatedContact, client_ip: Option<String>) -> Self {
        Self {
            name: contact.name,
            email: contact.email,
            message: contact.message,
            client_ip,
            verification_token: contact.verification_token,
            received_at: Utc::now(),
        }
    }
}

/// Delivers contact notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &ContactNotification) -> Result<()>;
}

/// Notification channel.
#[derive(Debug, Clone)]
pub enum NotificationChannel {
    /// Log only (default)
    Log,
    /// JSON POST to a webhook (mail relay, chat integration, ...)
    Webhook { url: String },
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving contact messages; log-only when unset
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fan-out notifier over the configured channels.
pub struct NotificationWorker {
    channels: Vec<NotificationChannel>,
    http: reqwest::Client,
}

impl Default for NotificationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationWorker {
    pub fn new() -> Self {
        Self {
            channels: vec![NotificationChannel::Log],
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        let mut worker = Self {
            channels: vec![NotificationChannel::Log],
            http,
        };
        if let Some(url) = config.webhook_url.as_ref().filter(|u| !u.trim().is_empty()) {
            worker = worker.with_channel(NotificationChannel::Webhook { url: url.clone() });
        }
        Ok(worker)
    }

    pub fn with_channel(mut self, channel: NotificationChannel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channels(&self) -> &[NotificationChannel] {
        &self.channels
    }
}

#[async_trait]
impl Notifier for NotificationWorker {
    async fn send(&self, notification: &ContactNotification) -> Result<()> {
        for channel in &self.channels {
            match channel {
                NotificationChannel::Log => {
                    info!(
                        client_ip = notification.client_ip.as_deref().unwrap_or("unknown"),
                        message_len = notification.message.chars().count(),
                        "Contact message received"
                    );
                }
                NotificationChannel::Webhook { url } => {
                    let response = self
                        .http
                        .post(url)
                        .json(notification)
                        .send()
                        .await
                        .map_err(|e| {
                            warn!(error = %e, "Contact webhook request failed");
                            Error::upstream(format!("Contact webhook unavailable: {}", e))
                        })?;

                    if !response.status().is_success() {
                        let status = response.status();
                        warn!(status = %status, "Contact webhook returned error");
                        return Err(Error::upstream(format!(
                            "Contact webhook returned {}",
                            status
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
