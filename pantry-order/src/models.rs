use serde::{Deserialize, Serialize};

/// A placed order: one product reference per purchased unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub product_ids: Vec<i64>,
}

impl Order {
    pub fn new(id: i64, product_ids: Vec<i64>) -> Self {
        Self { id, product_ids }
    }

    /// Number of purchased units
    pub fn unit_count(&self) -> usize {
        self.product_ids.len()
    }
}
