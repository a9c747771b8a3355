use async_trait::async_trait;

use crate::models::Product;
use crate::plugins::trackers::{CurrencyFormat, PriceChange};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub product_name: String,
    pub product_url: String,
    pub change: PriceChange,
    pub formatted_old: String,
    pub formatted_new: String,
}

impl NotificationEvent {
    pub fn new(product: &Product, change: PriceChange, currency: &CurrencyFormat) -> Self {
        Self {
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            change,
            formatted_old: currency.format(change.old),
            formatted_new: currency.format(change.new),
        }
    }

    /// Plain-text message body, with the product name in Slack bold markup.
    pub fn message(&self) -> String {
        format!(
            "Price of *{}* has changed from {} to {}",
            self.product_name, self.formatted_old, self.formatted_new
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered(status_code: u16) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn rejected(status_code: u16, error: String) -> Self {
        Self {
            success: false,
            status_code: Some(status_code),
            error: Some(error),
        }
    }
}

/// Delivers price change messages (Slack webhook, ...).
///
/// An `Err` means the message could not be sent at all; a delivered request the
/// endpoint refused comes back as `Ok` with `success == false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult>;
}
