//! Coupon Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::value_objects::{CouponCode, DiscountRate, Money};
use crate::domain::events::{CouponEvent, DomainEvent};

/// The fields the pricing engine reads from a coupon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponTerms {
    pub code: CouponCode,
    pub discount_rate: DiscountRate,
    pub min_subtotal: Money,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CouponTerms {
    /// Expired means `expires_at` is set and strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

#[derive(Clone, Debug)]
pub struct Coupon {
    id: Uuid,
    terms: CouponTerms,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// Stored state of a coupon, used to rebuild the aggregate without events.
#[derive(Clone, Debug)]
pub struct CouponParts {
    pub id: Uuid,
    pub terms: CouponTerms,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin edit; `None` leaves a field as it is.
#[derive(Clone, Debug, Default)]
pub struct CouponChanges {
    pub discount_rate: Option<DiscountRate>,
    pub min_subtotal: Option<Money>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl CouponChanges {
    pub fn is_empty(&self) -> bool {
        self.discount_rate.is_none() && self.min_subtotal.is_none() && self.expires_at.is_none() && self.is_active.is_none()
    }
}

impl Coupon {
    pub fn create(code: CouponCode, discount_rate: DiscountRate, min_subtotal: Money, expires_at: Option<DateTime<Utc>>) -> Result<Self, CouponError> {
        if min_subtotal.is_negative() { return Err(CouponError::NegativeMinimum); }
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut coupon = Self {
            id, terms: CouponTerms { code: code.clone(), discount_rate, min_subtotal, is_active: true, expires_at },
            deleted_at: None, created_at: now, updated_at: now, events: vec![],
        };
        coupon.raise_event(DomainEvent::Coupon(CouponEvent::Created { coupon_id: id, code }));
        Ok(coupon)
    }

    pub fn restore(parts: CouponParts) -> Self {
        Self {
            id: parts.id, terms: parts.terms, deleted_at: parts.deleted_at,
            created_at: parts.created_at, updated_at: parts.updated_at, events: vec![],
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn code(&self) -> &CouponCode { &self.terms.code }
    pub fn terms(&self) -> &CouponTerms { &self.terms }
    pub fn is_active(&self) -> bool { self.terms.is_active }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> { self.deleted_at }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn update(&mut self, changes: CouponChanges) -> Result<(), CouponError> {
        self.ensure_live()?;
        if changes.min_subtotal.is_some_and(|m| m.is_negative()) { return Err(CouponError::NegativeMinimum); }
        if changes.is_empty() { return Ok(()); }
        if let Some(rate) = changes.discount_rate { self.terms.discount_rate = rate; }
        if let Some(min) = changes.min_subtotal { self.terms.min_subtotal = min; }
        if let Some(expires_at) = changes.expires_at { self.terms.expires_at = expires_at; }
        if let Some(active) = changes.is_active { self.terms.is_active = active; }
        self.touch();
        self.raise_event(DomainEvent::Coupon(CouponEvent::Updated { coupon_id: self.id }));
        Ok(())
    }

    pub fn toggle_active(&mut self) -> Result<bool, CouponError> {
        self.ensure_live()?;
        self.terms.is_active = !self.terms.is_active;
        self.touch();
        self.raise_event(DomainEvent::Coupon(CouponEvent::ActiveToggled { coupon_id: self.id, is_active: self.terms.is_active }));
        Ok(self.terms.is_active)
    }

    pub fn soft_delete(&mut self) -> Result<(), CouponError> {
        self.ensure_live()?;
        self.deleted_at = Some(Utc::now());
        self.terms.is_active = false;
        self.touch();
        self.raise_event(DomainEvent::Coupon(CouponEvent::Deleted { coupon_id: self.id, hard: false }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn ensure_live(&self) -> Result<(), CouponError> {
        if self.is_deleted() { Err(CouponError::Deleted) } else { Ok(()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("minimum subtotal must not be negative")]
    NegativeMinimum,
    #[error("coupon has been deleted")]
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn welcome() -> Coupon {
        Coupon::create(CouponCode::new("welcome10").unwrap(), DiscountRate::new(Decimal::TEN).unwrap(), Money::zero(), None).unwrap()
    }

    #[test]
    fn test_coupon_create() {
        let mut c = welcome();
        assert_eq!(c.code().as_str(), "WELCOME10");
        assert!(c.is_active());
        let events = c.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject(), "coupon.created");
        assert!(c.take_events().is_empty());
    }

    #[test]
    fn test_coupon_rejects_negative_minimum() {
        let err = Coupon::create(CouponCode::new("X").unwrap(), DiscountRate::new(Decimal::TEN).unwrap(), Money::from_cents(-1), None);
        assert_eq!(err.unwrap_err(), CouponError::NegativeMinimum);
    }

    #[test]
    fn test_toggle_and_update() {
        let mut c = welcome();
        assert!(!c.toggle_active().unwrap());
        assert!(c.toggle_active().unwrap());
        c.update(CouponChanges { min_subtotal: Some(Money::from_cents(15000)), ..Default::default() }).unwrap();
        assert_eq!(c.terms().min_subtotal, Money::from_cents(15000));
        c.update(CouponChanges::default()).unwrap();
        assert_eq!(c.take_events().len(), 4);
    }

    #[test]
    fn test_soft_delete_freezes_coupon() {
        let mut c = welcome();
        c.soft_delete().unwrap();
        assert!(c.is_deleted());
        assert!(!c.is_active());
        assert_eq!(c.toggle_active(), Err(CouponError::Deleted));
        assert_eq!(c.soft_delete(), Err(CouponError::Deleted));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let mut terms = welcome().terms().clone();
        terms.expires_at = Some(now);
        assert!(!terms.is_expired_at(now));
        assert!(terms.is_expired_at(now + Duration::seconds(1)));
        terms.expires_at = None;
        assert!(!terms.is_expired_at(now + Duration::days(365)));
    }
}
