use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;
use crate::plugins::traits::{Notifier, NotificationEvent, NotificationResult};
use crate::utils::error::{AppError, Result};

pub const DEFAULT_USERNAME: &str = "price-check";

#[derive(Debug, Clone, PartialEq)]
pub struct SlackConfig {
    pub webhook_url: Url,
    pub username: String,
}

impl SlackConfig {
    /// Reads `slack.url` (required) and `slack.user` from the settings file.
    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, String> {
        let webhook_url = settings.get_str("slack.url").ok_or("Missing slack.url")?;

        let webhook_url = Url::parse(webhook_url)
            .map_err(|e| format!("Invalid slack.url: {}", e))?;
        if !matches!(webhook_url.scheme(), "http" | "https") {
            return Err(format!("Unsupported slack.url scheme: {}", webhook_url.scheme()));
        }

        let username = settings
            .get_str("slack.user")
            .unwrap_or(DEFAULT_USERNAME)
            .to_string();

        Ok(SlackConfig { webhook_url, username })
    }
}

/// Posts `{"username", "text"}` to a Slack incoming webhook.
///
/// Built even when the settings are incomplete; every send then fails with a
/// plugin error, which the checker logs and moves past.
pub struct SlackNotifier {
    client: Client,
    config: Option<SlackConfig>,
}

impl SlackNotifier {
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        let config = match SlackConfig::from_settings(settings) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Slack notifications disabled: {}", e);
                None
            }
        };
        SlackNotifier { client, config }
    }

    fn create_payload(&self, event: &NotificationEvent, config: &SlackConfig) -> serde_json::Value {
        json!({
            "username": config.username,
            "text": event.message(),
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        let config = self.config.as_ref().ok_or_else(|| AppError::Plugin {
            plugin_type: self.name().to_string(),
            message: "webhook is not configured".to_string(),
        })?;

        let payload = self.create_payload(event, config);
        let response = self
            .client
            .post(config.webhook_url.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Message sent");
            Ok(NotificationResult::delivered(status.as_u16()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Ok(NotificationResult::rejected(status.as_u16(), body))
        }
    }
}
