use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle policy a product is sold under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// Restocked after `lead_time` days once sold out
    Normal,
    /// Only sold inside its season window
    Seasonal,
    /// Perishable, unsellable once past its expiry date
    Expirable,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Normal => "NORMAL",
            ProductType::Seasonal => "SEASONAL",
            ProductType::Expirable => "EXPIRABLE",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ProductTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(ProductType::Normal),
            "SEASONAL" => Ok(ProductType::Seasonal),
            "EXPIRABLE" => Ok(ProductType::Expirable),
            other => Err(ProductTypeError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProductTypeError {
    #[error("Unknown product type: {0}")]
    Unknown(String),
}

/// A stocked product as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub product_type: ProductType,
    pub available: i32,
    /// Days until the next restock
    pub lead_time: i32,
    pub name: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub season_start_date: Option<DateTime<Utc>>,
    pub season_end_date: Option<DateTime<Utc>>,
}

impl Product {
    pub fn normal(id: i64, name: impl Into<String>, available: i32, lead_time: i32) -> Self {
        Self {
            id,
            product_type: ProductType::Normal,
            available,
            lead_time,
            name: name.into(),
            expiry_date: None,
            season_start_date: None,
            season_end_date: None,
        }
    }

    pub fn seasonal(
        id: i64,
        name: impl Into<String>,
        available: i32,
        lead_time: i32,
        season_start_date: DateTime<Utc>,
        season_end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            product_type: ProductType::Seasonal,
            season_start_date: Some(season_start_date),
            season_end_date: Some(season_end_date),
            ..Self::normal(id, name, available, lead_time)
        }
    }

    pub fn expirable(
        id: i64,
        name: impl Into<String>,
        available: i32,
        lead_time: i32,
        expiry_date: DateTime<Utc>,
    ) -> Self {
        Self {
            product_type: ProductType::Expirable,
            expiry_date: Some(expiry_date),
            ..Self::normal(id, name, available, lead_time)
        }
    }

    pub fn in_stock(&self) -> bool {
        self.available > 0
    }

    /// True when `now` lies strictly inside the season window.
    /// A missing bound closes the window.
    pub fn is_within_season(&self, now: DateTime<Utc>) -> bool {
        match (self.season_start_date, self.season_end_date) {
            (Some(start), Some(end)) => start < now && now < end,
            _ => false,
        }
    }

    /// True when the expiry date is strictly after `now`.
    /// A product without an expiry date counts as expired.
    pub fn is_not_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry > now)
    }

    /// Decrement stock by one unit and return the patch to persist
    pub fn take_one(&mut self) -> ProductPatch {
        self.available -= 1;
        ProductPatch::available(self.available)
    }

    /// Force stock to zero and return the patch to persist
    pub fn clear_stock(&mut self) -> ProductPatch {
        self.available = 0;
        ProductPatch::available(0)
    }
}

/// Partial column update for a product row. `None` leaves the column untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductPatch {
    pub available: Option<i32>,
    pub lead_time: Option<i32>,
}

impl ProductPatch {
    pub fn available(available: i32) -> Self {
        Self { available: Some(available), lead_time: None }
    }

    pub fn lead_time(lead_time: i32) -> Self {
        Self { available: None, lead_time: Some(lead_time) }
    }

    /// Re-write both stock columns with the product's current values
    pub fn stock_of(product: &Product) -> Self {
        Self {
            available: Some(product.available),
            lead_time: Some(product.lead_time),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_none() && self.lead_time.is_none()
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(available) = self.available {
            product.available = available;
        }
        if let Some(lead_time) = self.lead_time {
            product.lead_time = lead_time;
        }
    }
}
