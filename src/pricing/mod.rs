//! Pricing engine.
//!
//! Pure, synchronous functions shared by the HTTP service and the
//! [`client`](crate::client) session: coupon eligibility, then the fixed
//! sequence subtotal → discount → shipping → tax → total.

pub mod eligibility;
pub mod totals;

pub use eligibility::{evaluate, Eligibility, IneligibleReason, INVALID_COUPON_MESSAGE};
pub use totals::{compute_totals, OrderTotals, PricedCart, PricingPolicy};
