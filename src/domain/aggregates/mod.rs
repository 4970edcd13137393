//! Aggregates module
pub mod cart;
pub mod coupon;

pub use cart::{CartError, CartItem, CartSnapshot};
pub use coupon::{Coupon, CouponChanges, CouponError, CouponParts, CouponTerms};
