//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{Coupon, CouponTerms};
use crate::domain::value_objects::{DiscountRate, Money};
use crate::pricing::{Eligibility, IneligibleReason, OrderTotals};

pub const MISSING_CODE_MESSAGE: &str = "Coupon code is required.";

#[derive(Debug, Deserialize)]
pub struct ValidateParams { pub code: Option<String>, pub subtotal: Option<String> }

/// Body of `GET /api/coupons/validate`, also decoded by the client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidateResponse {
    pub fn missing_code() -> Self {
        Self { valid: false, coupon: None, discount_amount: None, message: Some(MISSING_CODE_MESSAGE.to_string()) }
    }

    /// The coupon record is only echoed back when it is usable or merely
    /// short of its minimum, never for unknown, inactive or expired codes.
    pub fn from_eligibility(coupon: Option<&CouponTerms>, eligibility: &Eligibility) -> Self {
        match eligibility {
            Eligibility::Eligible { discount_amount } => Self {
                valid: true,
                coupon: coupon.cloned(),
                discount_amount: Some(*discount_amount),
                message: coupon.map(|c| format!("Coupon applied: {}% off.", c.discount_rate)),
            },
            Eligibility::Ineligible(reason) => Self {
                valid: false,
                coupon: match reason { IneligibleReason::BelowMinimum { .. } => coupon.cloned(), _ => None },
                discount_amount: None,
                message: Some(reason.user_message()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest { pub product_id: Uuid, pub quantity: u32 }

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub delivery_address: serde_json::Value,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Total the client displayed; only used to detect drift.
    #[serde(default)]
    pub client_total: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponOutcome {
    pub code: String,
    pub applied: bool,
    pub discount_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CouponOutcome {
    pub fn new(code: impl Into<String>, eligibility: &Eligibility) -> Self {
        Self {
            code: code.into(),
            applied: eligibility.is_eligible(),
            discount_amount: eligibility.discount_amount(),
            message: eligibility.reason().map(IneligibleReason::user_message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub totals: OrderTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub session_id: Uuid,
    pub totals: OrderTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponOutcome>,
    pub adjusted: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCouponRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(range(min = 1.0, max = 90.0))]
    pub discount_rate: f64,
    #[validate(range(min = 0.0, max = 9999999999.99))]
    #[serde(default)]
    pub min_subtotal: f64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCouponRequest {
    #[validate(range(min = 1.0, max = 90.0))]
    pub discount_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 9999999999.99))]
    pub min_subtotal: Option<f64>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Removes the expiry; takes precedence over `expires_at`.
    #[serde(default)]
    pub clear_expiry: bool,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams { pub hard: Option<bool> }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponView {
    pub id: Uuid,
    pub code: String,
    pub discount_rate: DiscountRate,
    pub min_subtotal: Money,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Coupon> for CouponView {
    fn from(c: &Coupon) -> Self {
        let t = c.terms();
        Self {
            id: c.id(), code: t.code.to_string(), discount_rate: t.discount_rate, min_subtotal: t.min_subtotal,
            expires_at: t.expires_at, is_active: t.is_active, created_at: c.created_at(), updated_at: c.updated_at(),
        }
    }
}
