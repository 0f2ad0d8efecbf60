use anyhow::Result;
use async_trait::async_trait;

use triage_core::api::{Notifier, NotifierConfig};

use crate::http::{ensure_success, HttpError};

/// Posts `{"text": ...}` to an incoming-webhook URL (Slack-compatible).
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(cfg: &NotifierConfig) -> Result<Self> {
        let url = if cfg.enabled {
            cfg.webhook_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
        } else {
            None
        };
        if cfg.enabled && url.is_none() {
            tracing::warn!(
                "notifier enabled without webhook_url; notifications will only be logged"
            );
        }
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            url,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let Some(url) = &self.url else {
            tracing::info!(stage = "notify.log", "{message}");
            return Ok(());
        };

        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({ "text": message }))
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url.clone()))?;
        ensure_success(resp).await
    }
}
