//! Operator alert delivery
//!
//! The sink is chosen once at startup: a webhook when an endpoint is
//! configured, otherwise a sink that accepts and discards every message.

use crate::models::{Result, WatchError};
use async_trait::async_trait;
use log::debug;
use serde_json::json;

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Incoming-webhook sink (Mattermost/Slack `{"text": ...}` payload)
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn notify(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| WatchError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WatchError::Notification(format!("{}: {}", status, body.trim())));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl AlertSink for NoopSink {
    async fn notify(&self, text: &str) -> Result<()> {
        debug!("No webhook configured, alert not sent: {}", text);
        Ok(())
    }
}

/// Select the sink for an optional webhook URL
pub fn sink_for(webhook_url: Option<&str>) -> Box<dyn AlertSink> {
    match webhook_url {
        Some(url) => Box::new(WebhookSink::new(url)),
        None => Box::new(NoopSink),
    }
}
