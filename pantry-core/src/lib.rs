pub mod notifier;
pub mod policy;
pub mod repository;

pub use notifier::{MockNotifier, Notification, Notifier};
pub use policy::{PolicyError, ProductPolicy};
pub use repository::ProductRepository;

/// Error type returned across gateway boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
