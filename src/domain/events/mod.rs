//! Domain events
use crate::domain::value_objects::{CouponCode, Money};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Coupon(CouponEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Created { coupon_id: Uuid, code: CouponCode },
    Updated { coupon_id: Uuid },
    ActiveToggled { coupon_id: Uuid, is_active: bool },
    Deleted { coupon_id: Uuid, hard: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutEvent {
    SessionCreated { session_id: Uuid, total: Money, coupon_code: Option<CouponCode> },
}

impl DomainEvent {
    /// Bus subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Coupon(CouponEvent::Created { .. }) => "coupon.created",
            Self::Coupon(CouponEvent::Updated { .. } | CouponEvent::ActiveToggled { .. }) => "coupon.updated",
            Self::Coupon(CouponEvent::Deleted { .. }) => "coupon.deleted",
            Self::Checkout(CheckoutEvent::SessionCreated { .. }) => "checkout.session_created",
        }
    }
}
