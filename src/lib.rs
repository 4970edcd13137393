//! Storefront Pricing
//!
//! Coupon eligibility and order totals for the storefront checkout.
//!
//! ## Features
//! - Percentage coupons with minimum subtotal, expiry and active flag
//! - One pricing engine shared by cart, checkout and the checkout session
//! - Server-side repricing of every checkout from catalog prices
//! - Coupon administration with domain events on NATS
//! - Storefront session that caches and revalidates an applied coupon

use thiserror::Error;

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod pricing;
pub mod publisher;
pub mod store;

// =============================================================================
// Core Types
// =============================================================================

pub use domain::aggregates::{CartItem, CartSnapshot, Coupon, CouponTerms};
pub use domain::value_objects::{CouponCode, DiscountRate, Money, Quantity};
pub use pricing::{compute_totals, evaluate, Eligibility, IneligibleReason, OrderTotals, PricingPolicy};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PricingError {
    #[error(transparent)]
    Money(#[from] domain::value_objects::MoneyError),

    #[error(transparent)]
    CouponCode(#[from] domain::value_objects::CouponCodeError),

    #[error(transparent)]
    DiscountRate(#[from] domain::value_objects::DiscountRateError),

    #[error(transparent)]
    Quantity(#[from] domain::value_objects::QuantityError),

    #[error(transparent)]
    Cart(#[from] domain::aggregates::CartError),

    #[error(transparent)]
    Coupon(#[from] domain::aggregates::CouponError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Client error: {0}")]
    Client(#[from] client::ClientError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_line(price: &str, qty: u32) -> Result<CartItem> {
        Ok(CartItem::new("P1", price.parse::<Money>()?, Quantity::new(qty)?))
    }

    #[test]
    fn test_errors_convert() {
        assert!(matches!(parse_line("-1", 1), Err(PricingError::Money(_))));
        assert!(matches!(parse_line("1.00", 0), Err(PricingError::Quantity(_))));
        assert_eq!(parse_line("9.99", 2).unwrap().line_total(), Money::from_cents(1998));
    }
}
