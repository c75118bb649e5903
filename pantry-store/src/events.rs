use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pantry_core::{BoxError, Notification, Notifier};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::{error, info};

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    /// Enqueue without waiting for delivery. Fails only if the local queue rejects it.
    pub fn dispatch(&self, topic: &str, key: &str, payload: &str) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload);

        match self.producer.send_result(record) {
            Ok(_delivery) => {
                info!("Queued message for {}/{}", topic, key);
                Ok(())
            }
            Err((e, _record)) => {
                error!("Failed to queue message for {}: {}", topic, e);
                Err(e)
            }
        }
    }
}

/// Notification gateway publishing JSON events, keyed by product name
#[derive(Clone)]
pub struct EventNotifier {
    producer: EventProducer,
}

impl EventNotifier {
    pub fn new(producer: EventProducer) -> Self {
        Self { producer }
    }

    fn emit(&self, notification: &Notification) -> Result<(), BoxError> {
        let payload = serde_json::to_string(notification)?;
        self.producer
            .dispatch(notification.topic(), notification.product_name(), &payload)?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EventNotifier {
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
