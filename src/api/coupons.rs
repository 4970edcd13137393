//! Storefront coupon validation.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use crate::api::dto::{ValidateParams, ValidateResponse};
use crate::api::{ApiError, AppState};
use crate::domain::aggregates::Coupon;
use crate::domain::value_objects::{CouponCode, Money};
use crate::pricing::evaluate;
use crate::store::StoreError;

/// Fetches a live coupon by a user-typed code. Codes that cannot be
/// canonicalized cannot exist, so they resolve to `None`.
pub(crate) async fn lookup_coupon(state: &AppState, raw: &str) -> Result<Option<Coupon>, StoreError> {
    match CouponCode::new(raw) {
        Ok(code) => state.coupons.find_by_code(&code).await,
        Err(_) => Ok(None),
    }
}

pub(crate) fn parse_subtotal(raw: Option<&str>) -> Result<Money, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map_err(|e| ApiError::Validation(format!("subtotal: {e}"))),
        None => Ok(Money::zero()),
    }
}

pub async fn validate_coupon(State(s): State<AppState>, Query(p): Query<ValidateParams>) -> Result<Json<ValidateResponse>, ApiError> {
    let subtotal = parse_subtotal(p.subtotal.as_deref())?;
    let Some(raw) = p.code.as_deref().filter(|c| !c.trim().is_empty()) else {
        return Ok(Json(ValidateResponse::missing_code()));
    };
    let coupon = lookup_coupon(&s, raw).await?;
    let terms = coupon.as_ref().map(Coupon::terms);
    let eligibility = evaluate(terms, subtotal, Utc::now());
    tracing::debug!(code = raw, %subtotal, ?eligibility, "coupon validated");
    Ok(Json(ValidateResponse::from_eligibility(terms, &eligibility)))
}
