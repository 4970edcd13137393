//! Storage ports for coupons and catalog prices.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::domain::aggregates::Coupon;
use crate::domain::value_objects::{CouponCode, Money};

pub mod postgres;

pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("coupon code {0} already exists")]
    DuplicateCode(CouponCode),

    #[error("stored row is invalid: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Coupon records. Soft-deleted coupons are invisible to every read.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Looks up a live coupon by its canonical code.
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Coupon>, StoreError>;

    async fn list(&self) -> Result<Vec<Coupon>, StoreError>;

    async fn insert(&self, coupon: &Coupon) -> Result<(), StoreError>;

    /// Persists the current state of an existing coupon, including soft deletion.
    async fn save(&self, coupon: &Coupon) -> Result<(), StoreError>;

    /// Removes the row permanently. Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Authoritative unit prices for purchasable products.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Prices of the active products among `ids`; unknown ids are absent.
    async fn unit_prices(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Money>, StoreError>;
}
