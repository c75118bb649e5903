use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BoxError;

/// Customer-facing stock events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Delay {
        lead_time_days: i32,
        product_name: String,
    },
    OutOfStock {
        product_name: String,
    },
    Expiration {
        product_name: String,
        expiry_date: Option<DateTime<Utc>>,
    },
}

impl Notification {
    /// Topic the event is published on
    pub fn topic(&self) -> &'static str {
        match self {
            Notification::Delay { .. } => "notifications.delay",
            Notification::OutOfStock { .. } => "notifications.out_of_stock",
            Notification::Expiration { .. } => "notifications.expiration",
        }
    }

    pub fn product_name(&self) -> &str {
        match self {
            Notification::Delay { product_name, .. }
            | Notification::OutOfStock { product_name }
            | Notification::Expiration { product_name, .. } => product_name,
        }
    }
}

/// One-way notification gateway. Calls return once the event is dispatched,
/// not when it is delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_delay_notification(
        &self,
        lead_time_days: i32,
        product_name: &str,
    ) -> Result<(), BoxError>;

    async fn send_out_of_stock_notification(
        &self,
        product_name: &str,
    ) -> Result<(), BoxError>;

    async fn send_expiration_notification(
        &self,
        product_name: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<(), BoxError>;
}

/// Keeps every notification in memory instead of sending it
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, notification: Notification) -> Result<(), BoxError> {
        tracing::info!("Recorded {} notification for {}", notification.topic(), notification.product_name());
        self.sent
            .lock()
            .map_err(|_| "notification log poisoned")?
            .push(notification);
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_delay_notification(
        &self,
        lead_time_days: i32,
        product_name: &str,
    ) -> Result<(), BoxError> {
        self.record(Notification::Delay {
            lead_time_days,
            product_name: product_name.to_string(),
        })
    }

    async fn send_out_of_stock_notification(
        &self,
        product_name: &str,
    ) -> Result<(), BoxError> {
        self.record(Notification::OutOfStock {
            product_name: product_name.to_string(),
        })
    }

    async fn send_expiration_notification(
        &self,
        product_name: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<(), BoxError> {
        self.record(Notification::Expiration {
            product_name: product_name.to_string(),
            expiry_date,
        })
    }
}
