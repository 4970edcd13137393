//! Value Objects for pricing

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// Longest code the admin panel accepts.
pub const MAX_COUPON_CODE_LEN: usize = 32;

/// Coupon code value object, canonicalized to upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(value: impl Into<String>) -> Result<Self, CouponCodeError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(CouponCodeError::Empty); }
        if value.chars().count() > MAX_COUPON_CODE_LEN { return Err(CouponCodeError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponCodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self { code.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponCodeError {
    #[error("coupon code is empty")]
    Empty,
    #[error("coupon code is longer than 32 characters")]
    TooLong,
}

/// Money value object.
///
/// Always held at two decimal places; every constructor rounds half-up
/// (away from zero), so each displayed line is rounded on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Largest amount a `NUMERIC(12, 2)` column holds.
    pub const MAX: Money = Money(Decimal::from_parts(3_567_587_327, 232, 0, false, 2));

    pub fn new(amount: Decimal) -> Self {
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        Self(amount)
    }
    pub fn from_cents(cents: i64) -> Self { Self::new(Decimal::new(cents, 2)) }
    pub fn zero() -> Self { Self::new(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn is_negative(&self) -> bool { self.0.is_sign_negative() && !self.0.is_zero() }

    /// Floors the value at zero.
    pub fn clamp_non_negative(self) -> Money { if self.is_negative() { Money::zero() } else { self } }

    /// `max(0, self - other)`.
    pub fn saturating_sub(self, other: Money) -> Money { Money::new(self.0 - other.0).clamp_non_negative() }

    pub fn multiply(self, qty: Quantity) -> Money { self.scaled(Decimal::from(qty.value())) }

    /// `round2(self * rate)`, with `rate` a plain fraction (0.08 for 8%).
    pub fn apply_rate(self, rate: Decimal) -> Money { self.scaled(rate) }

    /// `round2(self * percent / 100)`.
    pub fn percent(self, percent: Decimal) -> Money { self.scaled(percent / Decimal::ONE_HUNDRED) }

    /// Saturates at `Decimal::MAX` instead of panicking on overflow.
    fn scaled(self, factor: Decimal) -> Money {
        Money::new(self.0.checked_mul(factor).unwrap_or(Decimal::MAX))
    }

    fn bounded(amount: Decimal) -> Result<Money, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(MoneyError::Negative); }
        if amount > Money::MAX.0 { return Err(MoneyError::TooLarge); }
        Ok(Money::new(amount))
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money { Money::new(self.0 + rhs.0) }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money { iter.fold(Money::zero(), |acc, m| acc + m) }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self { Money::new(amount) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

impl FromStr for Money {
    type Err = MoneyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Money::bounded(amount)
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let amount = Decimal::try_from(value).map_err(|_| MoneyError::Invalid(value.to_string()))?;
        Money::bounded(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Money::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("not a valid amount: {0}")]
    Invalid(String),
    #[error("amount must not be negative")]
    Negative,
    #[error("amount exceeds 9999999999.99")]
    TooLarge,
}

/// Percentage taken off the subtotal, 1 to 90 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    pub const MIN: Decimal = Decimal::ONE;
    pub const MAX: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

    pub fn new(percent: Decimal) -> Result<Self, DiscountRateError> {
        let percent = percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if percent < Self::MIN || percent > Self::MAX { return Err(DiscountRateError::OutOfRange(percent)); }
        Ok(Self(percent.normalize()))
    }
    pub fn percent(&self) -> Decimal { self.0 }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<f64> for DiscountRate {
    type Error = DiscountRateError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let percent = Decimal::try_from(value).map_err(|_| DiscountRateError::NotANumber)?;
        Self::new(percent)
    }
}

impl Serialize for DiscountRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for DiscountRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let percent = rust_decimal::serde::float::deserialize(deserializer)?;
        DiscountRate::new(percent).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountRateError {
    #[error("discount rate {0} is outside 1..=90")]
    OutOfRange(Decimal),
    #[error("discount rate is not a number")]
    NotANumber,
}

/// Quantity value object, at least one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 { return Err(QuantityError::Zero); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn checked_add(&self, other: Quantity) -> Option<Self> { self.0.checked_add(other.0).map(Self) }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(qty: Quantity) -> Self { qty.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity must be at least 1")]
    Zero,
}
