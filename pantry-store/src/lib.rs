pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod notifier;
pub mod order_repo;
#[cfg(feature = "kafka")]
pub mod events;

pub use catalog_repo::StoreProductRepository;
pub use database::DbClient;
pub use memory::InMemoryStore;
pub use notifier::LogNotifier;
pub use order_repo::StoreOrderRepository;
#[cfg(feature = "kafka")]
pub use events::{EventNotifier, EventProducer};
