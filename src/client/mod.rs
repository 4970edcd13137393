//! Storefront-side coupon handling.
//!
//! Mirrors what the checkout pages do: remember an applied coupon, ask the
//! service to revalidate it whenever the subtotal moves, and price the cart
//! with the same engine the server uses.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::api::dto::ValidateResponse;
use crate::domain::value_objects::{CouponCode, Money};

pub mod http;
pub mod session;
pub mod storage;

pub use http::HttpValidationClient;
pub use session::{CheckoutQuote, CouponSession, CouponStatus, NETWORK_WARNING};
pub use storage::{AppliedCoupon, CachedCoupon, CouponStorage, FileCouponStorage, MemoryCouponStorage, CACHE_VERSION};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("coupon cache io: {0}")]
    Io(#[from] std::io::Error),

    #[error("coupon cache encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Calls `GET /api/coupons/validate`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ValidationClient: Send + Sync {
    async fn validate(&self, code: &CouponCode, subtotal: Money) -> Result<ValidateResponse, ClientError>;
}
