pub mod models;
pub mod processor;
pub mod repository;

pub use models::Order;
pub use processor::{OrderError, OrderProcessor};
pub use repository::OrderRepository;
