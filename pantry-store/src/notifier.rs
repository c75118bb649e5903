use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pantry_core::{BoxError, Notification, Notifier};
use tracing::info;

/// Emits each notification as a structured log event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Topic and JSON payload as they are logged
    pub fn render(notification: &Notification) -> Result<(&'static str, String), BoxError> {
        Ok((notification.topic(), serde_json::to_string(notification)?))
    }

    fn emit(&self, notification: &Notification) -> Result<(), BoxError> {
        let (topic, payload) = Self::render(notification)?;
        info!(topic, %payload, "Notification dispatched");
        Ok(())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_delay_notification(
        &self,
        lead_time_days: i32,
        product_name: &str,
    ) -> Result<(), BoxError> {
        self.emit(&Notification::Delay {
            lead_time_days,
            product_name: product_name.to_string(),
        })
    }

    async fn send_out_of_stock_notification(
        &self,
        product_name: &str,
    ) -> Result<(), BoxError> {
        self.emit(&Notification::OutOfStock {
            product_name: product_name.to_string(),
        })
    }

    async fn send_expiration_notification(
        &self,
        product_name: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<(), BoxError> {
        self.emit(&Notification::Expiration {
            product_name: product_name.to_string(),
            expiry_date,
        })
    }
}
