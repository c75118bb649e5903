use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pantry_catalog::{Product, ProductPatch, ProductType};
use tracing::{debug, info};

use crate::notifier::Notifier;
use crate::repository::ProductRepository;
use crate::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Failed to persist product {product_id}: {source}")]
    Persist {
        product_id: i64,
        #[source]
        source: BoxError,
    },

    #[error("Failed to notify about product {product_id}: {source}")]
    Notify {
        product_id: i64,
        #[source]
        source: BoxError,
    },
}

/// Decides, for one purchased unit, whether stock is taken or a customer
/// notification goes out instead.
///
/// Each call mutates the product in place and writes the same change through
/// the repository. Nothing guards the read-modify-write: two evaluations of
/// the same row from separate requests can lose an update.
#[derive(Clone)]
pub struct ProductPolicy {
    products: Arc<dyn ProductRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ProductPolicy {
    pub fn new(products: Arc<dyn ProductRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { products, notifier }
    }

    /// Process one purchased unit as of the current time
    pub async fn process_one_unit(&self, product: &mut Product) -> Result<(), PolicyError> {
        self.process_one_unit_at(product, Utc::now()).await
    }

    pub async fn process_one_unit_at(
        &self,
        product: &mut Product,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        match product.product_type {
            ProductType::Normal => {
                if product.in_stock() {
                    self.take_one(product).await
                } else if product.lead_time > 0 {
                    let lead_time = product.lead_time;
                    self.notify_delay(lead_time, product).await
                } else {
                    debug!("Product {} is sold out with no restock planned", product.id);
                    Ok(())
                }
            }
            ProductType::Seasonal => {
                if product.is_within_season(now) && product.in_stock() {
                    self.take_one(product).await
                } else {
                    self.handle_seasonal_restock(product, now).await
                }
            }
            ProductType::Expirable => {
                if product.in_stock() && product.is_not_expired(now) {
                    self.take_one(product).await
                } else {
                    self.handle_expiration(product, now).await
                }
            }
        }
    }

    /// Record the restock delay and tell the customer about it
    pub async fn notify_delay(&self, lead_time: i32, product: &mut Product) -> Result<(), PolicyError> {
        product.lead_time = lead_time;
        self.persist(product.id, ProductPatch::lead_time(lead_time)).await?;

        info!("Product {} delayed by {} days", product.id, lead_time);
        self.notifier
            .send_delay_notification(lead_time, &product.name)
            .await
            .map_err(|source| PolicyError::Notify { product_id: product.id, source })
    }

    /// A seasonal product that could not be sold right now
    pub async fn handle_seasonal_restock(
        &self,
        product: &mut Product,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        // A restock date past the calendar range lands after any season end.
        let expected_restock_date =
            now.checked_add_signed(Duration::days(i64::from(product.lead_time)));

        // An open-ended season cannot be restocked into.
        let restock_after_season = match (expected_restock_date, product.season_end_date) {
            (Some(restock), Some(end)) => restock > end,
            _ => true,
        };
        let season_not_started = product.season_start_date.map_or(false, |start| start > now);

        if restock_after_season {
            info!("Product {} cannot be restocked before its season ends", product.id);
            self.notify_out_of_stock(product).await?;
            let patch = product.clear_stock();
            self.persist(product.id, patch).await
        } else if season_not_started {
            info!("Product {} requested before its season starts", product.id);
            self.notify_out_of_stock(product).await?;
            self.persist(product.id, ProductPatch::stock_of(product)).await
        } else {
            let lead_time = product.lead_time;
            self.notify_delay(lead_time, product).await
        }
    }

    /// An expirable product that could not be sold right now
    pub async fn handle_expiration(
        &self,
        product: &mut Product,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        // Unreachable from process_one_unit_at, which already took this branch.
        if product.in_stock() && product.is_not_expired(now) {
            return self.take_one(product).await;
        }

        info!("Product {} expired on {:?}", product.id, product.expiry_date);
        self.notifier
            .send_expiration_notification(&product.name, product.expiry_date)
            .await
            .map_err(|source| PolicyError::Notify { product_id: product.id, source })?;

        let patch = product.clear_stock();
        self.persist(product.id, patch).await
    }

    async fn take_one(&self, product: &mut Product) -> Result<(), PolicyError> {
        let patch = product.take_one();
        debug!("Product {} decremented to {}", product.id, product.available);
        self.persist(product.id, patch).await
    }

    async fn notify_out_of_stock(&self, product: &Product) -> Result<(), PolicyError> {
        self.notifier
            .send_out_of_stock_notification(&product.name)
            .await
            .map_err(|source| PolicyError::Notify { product_id: product.id, source })
    }

    async fn persist(&self, product_id: i64, patch: ProductPatch) -> Result<(), PolicyError> {
        self.products
            .update_product(product_id, patch)
            .await
            .map_err(|source| PolicyError::Persist { product_id, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{MockNotifier, Notification};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records every patch instead of storing it
    #[derive(Default)]
    struct PatchLog {
        patches: Mutex<Vec<(i64, ProductPatch)>>,
    }

    impl PatchLog {
        fn patches(&self) -> Vec<(i64, ProductPatch)> {
            self.patches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProductRepository for PatchLog {
        async fn find_product_by_id(&self, _id: i64) -> Result<Option<Product>, BoxError> {
            Ok(None)
        }

        async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<(), BoxError> {
            self.patches.lock().unwrap().push((id, patch));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_delay_notification(&self, _: i32, _: &str) -> Result<(), BoxError> {
            Err("broker unavailable".into())
        }

        async fn send_out_of_stock_notification(&self, _: &str) -> Result<(), BoxError> {
            Err("broker unavailable".into())
        }

        async fn send_expiration_notification(
            &self,
            _: &str,
            _: Option<DateTime<Utc>>,
        ) -> Result<(), BoxError> {
            Err("broker unavailable".into())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn setup() -> (ProductPolicy, Arc<PatchLog>, Arc<MockNotifier>) {
        let repo = Arc::new(PatchLog::default());
        let notifier = Arc::new(MockNotifier::new());
        let policy = ProductPolicy::new(repo.clone(), notifier.clone());
        (policy, repo, notifier)
    }

    #[tokio::test]
    async fn test_normal_in_stock_decrements() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::normal(1, "USB Cable", 30, 15);

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 29);
        assert_eq!(repo.patches(), vec![(1, ProductPatch::available(29))]);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_normal_sold_out_sends_delay() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::normal(2, "USB Dongle", 0, 10);

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(repo.patches(), vec![(2, ProductPatch::lead_time(10))]);
        assert_eq!(
            notifier.sent(),
            vec![Notification::Delay { lead_time_days: 10, product_name: "USB Dongle".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_normal_sold_out_without_lead_time_is_noop() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::normal(3, "Discontinued", 0, 0);

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product, Product::normal(3, "Discontinued", 0, 0));
        assert!(repo.patches().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_seasonal_in_season_decrements() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            4,
            "Watermelon",
            30,
            15,
            now() - Duration::days(2),
            now() + Duration::days(58),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 29);
        assert_eq!(repo.patches(), vec![(4, ProductPatch::available(29))]);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_seasonal_before_season_is_out_of_stock() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            5,
            "Grapes",
            30,
            15,
            now() + Duration::days(180),
            now() + Duration::days(240),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 30);
        assert_eq!(product.lead_time, 15);
        assert_eq!(
            repo.patches(),
            vec![(5, ProductPatch { available: Some(30), lead_time: Some(15) })]
        );
        assert_eq!(
            notifier.sent(),
            vec![Notification::OutOfStock { product_name: "Grapes".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_seasonal_restock_after_season_end_clears_stock() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            6,
            "Strawberries",
            0,
            20,
            now() - Duration::days(10),
            now() + Duration::days(5),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(repo.patches(), vec![(6, ProductPatch::available(0))]);
        assert_eq!(
            notifier.sent(),
            vec![Notification::OutOfStock { product_name: "Strawberries".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_seasonal_sold_out_in_season_sends_delay() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            7,
            "Pumpkin",
            0,
            3,
            now() - Duration::days(10),
            now() + Duration::days(30),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(repo.patches(), vec![(7, ProductPatch::lead_time(3))]);
        assert_eq!(
            notifier.sent(),
            vec![Notification::Delay { lead_time_days: 3, product_name: "Pumpkin".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_seasonal_at_season_start_is_out_of_season() {
        let (policy, _repo, notifier) = setup();
        let mut product = Product::seasonal(
            8,
            "Chestnuts",
            10,
            2,
            now(),
            now() + Duration::days(30),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        // The window is strictly open so no unit is taken, but a start equal
        // to now does not count as "not started" either: this is a delay.
        assert_eq!(product.available, 10);
        assert_eq!(
            notifier.sent(),
            vec![Notification::Delay { lead_time_days: 2, product_name: "Chestnuts".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_seasonal_without_end_date_clears_stock() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            9,
            "Mystery Fruit",
            12,
            1,
            now() - Duration::days(1),
            now() + Duration::days(1),
        );
        product.season_end_date = None;

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(repo.patches(), vec![(9, ProductPatch::available(0))]);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_seasonal_lead_time_beyond_calendar_clears_stock() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::seasonal(
            17,
            "Cloudberries",
            0,
            i32::MAX,
            now() - Duration::days(5),
            now() + Duration::days(5),
        );

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(repo.patches(), vec![(17, ProductPatch::available(0))]);
        assert_eq!(
            notifier.sent(),
            vec![Notification::OutOfStock { product_name: "Cloudberries".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_expirable_fresh_decrements() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::expirable(10, "Butter", 30, 15, now() + Duration::days(26));

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 29);
        assert_eq!(repo.patches(), vec![(10, ProductPatch::available(29))]);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_expirable_past_expiry_clears_stock() {
        let (policy, repo, notifier) = setup();
        let expiry = now() - Duration::days(2);
        let mut product = Product::expirable(11, "Milk", 6, 15, expiry);

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(repo.patches(), vec![(11, ProductPatch::available(0))]);
        assert_eq!(
            notifier.sent(),
            vec![Notification::Expiration { product_name: "Milk".to_string(), expiry_date: Some(expiry) }]
        );
    }

    #[tokio::test]
    async fn test_expirable_expiring_now_is_expired() {
        let (policy, _repo, notifier) = setup();
        let mut product = Product::expirable(12, "Yogurt", 4, 15, now());

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert!(matches!(notifier.sent()[0], Notification::Expiration { .. }));
    }

    #[tokio::test]
    async fn test_expirable_without_expiry_date_is_expired() {
        let (policy, _repo, notifier) = setup();
        let mut product = Product::expirable(13, "Cheese", 4, 15, now());
        product.expiry_date = None;

        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 0);
        assert_eq!(
            notifier.sent(),
            vec![Notification::Expiration { product_name: "Cheese".to_string(), expiry_date: None }]
        );
    }

    #[tokio::test]
    async fn test_expiration_handler_reentry_decrements() {
        let (policy, repo, notifier) = setup();
        let mut product = Product::expirable(14, "Butter", 3, 15, now() + Duration::days(1));

        policy.handle_expiration(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 2);
        assert_eq!(repo.patches(), vec![(14, ProductPatch::available(2))]);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_unit_decrements_twice() {
        let (policy, repo, _notifier) = setup();
        let mut product = Product::normal(15, "USB Cable", 5, 15);

        policy.process_one_unit_at(&mut product, now()).await.unwrap();
        policy.process_one_unit_at(&mut product, now()).await.unwrap();

        assert_eq!(product.available, 3);
        assert_eq!(
            repo.patches(),
            vec![(15, ProductPatch::available(4)), (15, ProductPatch::available(3))]
        );
    }

    #[tokio::test]
    async fn test_notifier_failure_propagates() {
        let repo = Arc::new(PatchLog::default());
        let policy = ProductPolicy::new(repo.clone(), Arc::new(FailingNotifier));
        let mut product = Product::normal(16, "USB Dongle", 0, 10);

        let err = policy.process_one_unit_at(&mut product, now()).await.unwrap_err();

        assert!(matches!(err, PolicyError::Notify { product_id: 16, .. }));
        // The delay is persisted before the notification is attempted.
        assert_eq!(repo.patches(), vec![(16, ProductPatch::lead_time(10))]);
    }
}
