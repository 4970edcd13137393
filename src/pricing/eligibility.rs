//! Coupon eligibility.
//!
//! A coupon that cannot be applied is a normal outcome, not an error: the
//! evaluator always returns an [`Eligibility`] and never fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::CouponTerms;
use crate::domain::value_objects::Money;

/// Shown for unknown, inactive and expired codes alike so the response does
/// not reveal whether a code exists.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon code.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibleReason {
    NotFound,
    Inactive,
    Expired,
    BelowMinimum { min_subtotal: Money, shortfall: Money },
}

impl IneligibleReason {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound | Self::Inactive | Self::Expired => INVALID_COUPON_MESSAGE.to_string(),
            Self::BelowMinimum { min_subtotal, shortfall } => {
                format!("Minimum order of ${min_subtotal} required. Add ${shortfall} more to use this coupon.")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible { discount_amount: Money },
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool { matches!(self, Self::Eligible { .. }) }

    /// Zero unless eligible.
    pub fn discount_amount(&self) -> Money {
        match self {
            Self::Eligible { discount_amount } => *discount_amount,
            Self::Ineligible(_) => Money::zero(),
        }
    }

    pub fn reason(&self) -> Option<&IneligibleReason> {
        match self {
            Self::Eligible { .. } => None,
            Self::Ineligible(reason) => Some(reason),
        }
    }
}

/// Decides whether `coupon` applies to `subtotal` at `now`.
///
/// Checks run in order: existence, active flag, expiry, minimum subtotal.
/// The discount is `round2(subtotal * rate / 100)` and never exceeds the
/// subtotal.
pub fn evaluate(coupon: Option<&CouponTerms>, subtotal: Money, now: DateTime<Utc>) -> Eligibility {
    let Some(coupon) = coupon else {
        return Eligibility::Ineligible(IneligibleReason::NotFound);
    };
    if !coupon.is_active {
        return Eligibility::Ineligible(IneligibleReason::Inactive);
    }
    if coupon.is_expired_at(now) {
        return Eligibility::Ineligible(IneligibleReason::Expired);
    }
    if subtotal < coupon.min_subtotal {
        return Eligibility::Ineligible(IneligibleReason::BelowMinimum {
            min_subtotal: coupon.min_subtotal,
            shortfall: coupon.min_subtotal.saturating_sub(subtotal),
        });
    }
    let base = subtotal.clamp_non_negative();
    let discount_amount = base.percent(coupon.discount_rate.percent()).min(base);
    Eligibility::Eligible { discount_amount }
}
