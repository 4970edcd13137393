//! Applied-coupon session with request fencing.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::api::dto::ValidateResponse;
use crate::client::storage::{AppliedCoupon, CouponStorage};
use crate::client::{ClientError, ValidationClient};
use crate::domain::aggregates::CartSnapshot;
use crate::domain::value_objects::{CouponCode, Money};
use crate::pricing::{OrderTotals, PricingPolicy, INVALID_COUPON_MESSAGE};

pub const NETWORK_WARNING: &str = "Could not validate coupon, please try again";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouponStatus {
    /// No coupon is applied.
    Empty,
    Applied(AppliedCoupon),
    /// The service answered `valid: false`; the cached coupon was cleared.
    Rejected { message: String },
    /// The service could not be reached. Any cached coupon is kept for the
    /// next attempt but contributes no discount.
    Unverified { kept: Option<AppliedCoupon>, message: String },
    /// A newer request was issued while this one was in flight; drop it.
    Superseded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutQuote {
    pub totals: OrderTotals,
    pub status: CouponStatus,
}

impl AppliedCoupon {
    fn from_response(r: &ValidateResponse) -> Option<Self> {
        let coupon = r.coupon.as_ref()?;
        Some(Self { code: coupon.code.clone(), discount_rate: coupon.discount_rate, discount_amount: r.discount_amount? })
    }
}

pub struct CouponSession<C, S> {
    client: C,
    storage: Mutex<S>,
    sequence: AtomicU64,
    policy: PricingPolicy,
}

impl<C: ValidationClient, S: CouponStorage> CouponSession<C, S> {
    pub fn new(client: C, storage: S) -> Self {
        Self { client, storage: Mutex::new(storage), sequence: AtomicU64::new(0), policy: PricingPolicy::default() }
    }

    /// The cached coupon as stored, without revalidating it.
    pub async fn applied(&self) -> Result<Option<AppliedCoupon>, ClientError> {
        self.storage.lock().await.load()
    }

    /// Explicit "Apply" of a typed code.
    pub async fn apply(&self, code: &str, subtotal: Money) -> Result<CouponStatus, ClientError> {
        let ticket = self.next_ticket();
        let Ok(code) = CouponCode::new(code) else {
            self.storage.lock().await.clear()?;
            return Ok(CouponStatus::Rejected { message: INVALID_COUPON_MESSAGE.to_string() });
        };
        let kept = self.applied().await?;
        self.settle(ticket, &code, subtotal, kept).await
    }

    /// Re-checks the cached coupon against a new subtotal.
    pub async fn revalidate(&self, subtotal: Money) -> Result<CouponStatus, ClientError> {
        let ticket = self.next_ticket();
        let Some(cached) = self.applied().await? else { return Ok(CouponStatus::Empty) };
        let code = cached.code.clone();
        self.settle(ticket, &code, subtotal, Some(cached)).await
    }

    pub async fn remove(&self) -> Result<(), ClientError> {
        self.next_ticket();
        self.storage.lock().await.clear()
    }

    /// Revalidates against the cart's subtotal and prices the cart. Returns
    /// `None` when a newer request superseded this one.
    pub async fn quote(&self, cart: &CartSnapshot) -> Result<Option<CheckoutQuote>, ClientError> {
        let subtotal = cart.subtotal();
        let status = self.revalidate(subtotal).await?;
        let discount = match &status {
            CouponStatus::Superseded => return Ok(None),
            CouponStatus::Applied(applied) => applied.discount_amount,
            _ => Money::zero(),
        };
        Ok(Some(CheckoutQuote { totals: self.policy.totals_for(subtotal, discount), status }))
    }

    fn next_ticket(&self) -> u64 { self.sequence.fetch_add(1, Ordering::SeqCst) + 1 }

    fn is_current(&self, ticket: u64) -> bool { self.sequence.load(Ordering::SeqCst) == ticket }

    async fn settle(&self, ticket: u64, code: &CouponCode, subtotal: Money, kept: Option<AppliedCoupon>) -> Result<CouponStatus, ClientError> {
        let result = self.client.validate(code, subtotal).await;
        // Checked under the lock so a newer request's write is never overwritten.
        let mut storage = self.storage.lock().await;
        if !self.is_current(ticket) {
            tracing::debug!(%code, ticket, "discarding stale coupon validation");
            return Ok(CouponStatus::Superseded);
        }
        match result {
            Ok(r) if r.valid => match AppliedCoupon::from_response(&r) {
                Some(applied) => {
                    storage.save(&applied)?;
                    Ok(CouponStatus::Applied(applied))
                }
                None => {
                    tracing::warn!(%code, "validation response is missing coupon details");
                    Ok(unverified(kept))
                }
            },
            Ok(r) => {
                storage.clear()?;
                Ok(CouponStatus::Rejected { message: r.message.unwrap_or_else(|| INVALID_COUPON_MESSAGE.to_string()) })
            }
            Err(e) => {
                tracing::warn!(%code, error = %e, "coupon validation failed, keeping cached coupon");
                Ok(unverified(kept))
            }
        }
    }
}

fn unverified(kept: Option<AppliedCoupon>) -> CouponStatus {
    CouponStatus::Unverified { kept, message: NETWORK_WARNING.to_string() }
}
