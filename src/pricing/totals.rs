//! Order totals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{CartSnapshot, CouponTerms};
use crate::domain::value_objects::Money;
use crate::pricing::eligibility::{evaluate, Eligibility};

/// Shipping and tax rules shared by every caller of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Shipping is free when the discounted subtotal is strictly above this.
    pub free_shipping_over: Money,
    pub flat_shipping: Money,
    /// Applied to discounted subtotal plus shipping.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_over: Money::from_cents(10_000),
            flat_shipping: Money::from_cents(1_500),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub discounted_subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Totals together with the coupon decision that produced the discount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedCart {
    pub totals: OrderTotals,
    pub eligibility: Option<Eligibility>,
}

impl PricingPolicy {
    /// Prices `cart`, re-evaluating `coupon` against the cart's own subtotal.
    pub fn price(&self, cart: &CartSnapshot, coupon: Option<&CouponTerms>, now: DateTime<Utc>) -> PricedCart {
        let subtotal = cart.subtotal().clamp_non_negative();
        let eligibility = coupon.map(|c| evaluate(Some(c), subtotal, now));
        let discount = eligibility.as_ref().map_or_else(Money::zero, Eligibility::discount_amount);
        PricedCart { totals: self.totals_for(subtotal, discount), eligibility }
    }

    pub fn compute_totals(&self, cart: &CartSnapshot, coupon: Option<&CouponTerms>, now: DateTime<Utc>) -> OrderTotals {
        self.price(cart, coupon, now).totals
    }

    /// Runs the pipeline from the discount step onward.
    ///
    /// The free-shipping threshold is checked against the discounted
    /// subtotal, so a coupon can move an order back under the line.
    pub fn totals_for(&self, subtotal: Money, discount_amount: Money) -> OrderTotals {
        let subtotal = subtotal.clamp_non_negative();
        let discount_amount = discount_amount.clamp_non_negative().min(subtotal);
        let discounted_subtotal = subtotal.saturating_sub(discount_amount);
        let shipping = if discounted_subtotal > self.free_shipping_over { Money::zero() } else { self.flat_shipping };
        let tax = (discounted_subtotal + shipping).apply_rate(self.tax_rate);
        let total = discounted_subtotal + shipping + tax;
        OrderTotals { subtotal, discount_amount, discounted_subtotal, shipping, tax, total }
    }
}

/// [`PricingPolicy::compute_totals`] under the default policy.
pub fn compute_totals(cart: &CartSnapshot, coupon: Option<&CouponTerms>, now: DateTime<Utc>) -> OrderTotals {
    PricingPolicy::default().compute_totals(cart, coupon, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::aggregates::CartItem;
    use crate::domain::value_objects::{CouponCode, DiscountRate, Quantity};
    use crate::pricing::IneligibleReason;

    fn cart(lines: &[(i64, u32)]) -> CartSnapshot {
        CartSnapshot::from_items(lines.iter().enumerate().map(|(i, (cents, qty))| {
            CartItem::new(format!("P{i}"), Money::from_cents(*cents), Quantity::new(*qty).unwrap())
        })).unwrap()
    }

    fn coupon(code: &str, rate: i64, min_cents: i64) -> CouponTerms {
        CouponTerms {
            code: CouponCode::new(code).unwrap(),
            discount_rate: DiscountRate::new(Decimal::new(rate, 0)).unwrap(),
            min_subtotal: Money::from_cents(min_cents),
            is_active: true,
            expires_at: None,
        }
    }

    fn m(cents: i64) -> Money { Money::from_cents(cents) }

    #[test]
    fn test_no_coupon_free_shipping() {
        let totals = compute_totals(&cart(&[(6000, 1), (5000, 1)]), None, Utc::now());
        assert_eq!(totals, OrderTotals {
            subtotal: m(11000), discount_amount: m(0), discounted_subtotal: m(11000),
            shipping: m(0), tax: m(880), total: m(11880),
        });
    }

    #[test]
    fn test_coupon_drops_order_under_free_shipping() {
        let welcome = coupon("WELCOME10", 10, 0);
        let totals = compute_totals(&cart(&[(6000, 1), (5000, 1)]), Some(&welcome), Utc::now());
        assert_eq!(totals, OrderTotals {
            subtotal: m(11000), discount_amount: m(1100), discounted_subtotal: m(9900),
            shipping: m(1500), tax: m(912), total: m(12312),
        });
    }

    #[test]
    fn test_shipping_threshold_uses_discounted_base() {
        let totals = compute_totals(&cart(&[(11000, 1)]), Some(&coupon("TWENTY", 20, 0)), Utc::now());
        assert_eq!(totals.discount_amount, m(2200));
        assert_eq!(totals.discounted_subtotal, m(8800));
        assert_eq!(totals.shipping, m(1500));
        assert_eq!(totals.tax, m(824));
        assert_eq!(totals.total, m(11124));
    }

    #[test]
    fn test_threshold_is_strict() {
        let totals = compute_totals(&cart(&[(10000, 1)]), None, Utc::now());
        assert_eq!(totals.shipping, m(1500));
        let totals = compute_totals(&cart(&[(10001, 1)]), None, Utc::now());
        assert_eq!(totals.shipping, m(0));
    }

    #[test]
    fn test_below_minimum_falls_back_to_no_coupon() {
        let items = cart(&[(6000, 1), (5000, 1)]);
        let now = Utc::now();
        let priced = PricingPolicy::default().price(&items, Some(&coupon("BIG", 10, 15000)), now);
        assert!(matches!(priced.eligibility.as_ref().and_then(Eligibility::reason), Some(IneligibleReason::BelowMinimum { .. })));
        assert_eq!(priced.totals, compute_totals(&items, None, now));
    }

    #[test]
    fn test_expired_coupon_is_ignored() {
        let mut expired = coupon("OLD", 50, 0);
        expired.expires_at = Some(Utc::now() - Duration::days(1));
        let items = cart(&[(20000, 1)]);
        let now = Utc::now();
        assert_eq!(compute_totals(&items, Some(&expired), now), compute_totals(&items, None, now));
    }

    #[test]
    fn test_deterministic() {
        let items = cart(&[(1999, 3), (4550, 2), (1, 7)]);
        let c = coupon("MIX", 17, 0);
        let now = Utc::now();
        assert_eq!(compute_totals(&items, Some(&c), now), compute_totals(&items, Some(&c), now));
    }

    #[test]
    fn test_discount_larger_than_subtotal_is_clamped() {
        let totals = PricingPolicy::default().totals_for(m(1000), m(5000));
        assert_eq!(totals.discount_amount, m(1000));
        assert_eq!(totals.discounted_subtotal, m(0));
        assert_eq!(totals.shipping, m(1500));
        assert_eq!(totals.tax, m(120));
        assert_eq!(totals.total, m(1620));
    }

    #[test]
    fn test_corrupt_price_never_goes_negative() {
        let totals = compute_totals(&cart(&[(-5000, 1)]), Some(&coupon("X", 10, 0)), Utc::now());
        assert_eq!(totals.subtotal, m(0));
        assert_eq!(totals.discounted_subtotal, m(0));
        assert!(!totals.total.is_negative());
    }

    #[test]
    fn test_empty_cart_still_pays_shipping() {
        let totals = compute_totals(&CartSnapshot::new(), None, Utc::now());
        assert_eq!(totals, OrderTotals {
            subtotal: m(0), discount_amount: m(0), discounted_subtotal: m(0),
            shipping: m(1500), tax: m(120), total: m(1620),
        });
    }

    #[test]
    fn test_total_identity_holds() {
        let policy = PricingPolicy::default();
        let now = Utc::now();
        for cents in (0..30_000).step_by(773) {
            let c = coupon("ANY", 1 + cents % 90, 0);
            let t = policy.compute_totals(&cart(&[(cents, 1)]), Some(&c), now);
            assert_eq!(t.discounted_subtotal, t.subtotal.saturating_sub(t.discount_amount));
            assert_eq!(t.total, t.discounted_subtotal + t.shipping + t.tax);
            assert!(!t.total.is_negative());
        }
    }
}
