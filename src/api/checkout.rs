//! Authoritative pricing for previews and checkout.
//!
//! Client-sent prices, discounts and totals are never read: unit prices come
//! from the catalog, the coupon is re-fetched by code and re-evaluated, and
//! the totals are recomputed from scratch on every request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::coupons::lookup_coupon;
use crate::api::dto::{CheckoutSessionRequest, CheckoutSessionResponse, CouponOutcome, ItemRequest, QuoteRequest, QuoteResponse};
use crate::api::{ApiError, AppState};
use crate::domain::aggregates::{CartItem, CartSnapshot, Coupon};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::{CouponCode, Money, Quantity};
use crate::pricing::{Eligibility, IneligibleReason, PricedCart};

struct AuthoritativeQuote {
    priced: PricedCart,
    coupon: Option<CouponOutcome>,
    applied_code: Option<CouponCode>,
}

fn requested_code(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|c| !c.is_empty())
}

async fn authoritative_quote(s: &AppState, items: &[ItemRequest], coupon_code: Option<&str>) -> Result<AuthoritativeQuote, ApiError> {
    if items.is_empty() { return Err(ApiError::Validation("cart is empty".to_string())); }
    let mut ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let code = requested_code(coupon_code);

    // Cart prices and the coupon record are independent reads.
    let (prices, coupon): (HashMap<Uuid, Money>, Option<Coupon>) = tokio::try_join!(
        s.catalog.unit_prices(&ids),
        async { match code { Some(raw) => lookup_coupon(s, raw).await, None => Ok(None) } },
    )?;

    let mut cart = CartSnapshot::new();
    for item in items {
        let quantity = Quantity::new(item.quantity).map_err(|e| ApiError::Validation(format!("product {}: {e}", item.product_id)))?;
        let unit_price = *prices.get(&item.product_id).ok_or(ApiError::Unpriceable(item.product_id))?;
        cart.add_item(CartItem::new(item.product_id.to_string(), unit_price, quantity))
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let now = Utc::now();
    let priced = match (code, &coupon) {
        (Some(_), Some(found)) => s.policy.price(&cart, Some(found.terms()), now),
        (Some(_), None) => PricedCart {
            eligibility: Some(Eligibility::Ineligible(IneligibleReason::NotFound)),
            ..s.policy.price(&cart, None, now)
        },
        (None, _) => s.policy.price(&cart, None, now),
    };
    let outcome = code.zip(priced.eligibility.as_ref()).map(|(raw, e)| CouponOutcome::new(raw.trim().to_uppercase(), e));
    let applied_code = coupon.filter(|_| priced.eligibility.as_ref().is_some_and(Eligibility::is_eligible)).map(|c| c.code().clone());
    Ok(AuthoritativeQuote { priced, coupon: outcome, applied_code })
}

pub async fn quote(State(s): State<AppState>, Json(r): Json<QuoteRequest>) -> Result<Json<QuoteResponse>, ApiError> {
    let q = authoritative_quote(&s, &r.items, r.coupon_code.as_deref()).await?;
    Ok(Json(QuoteResponse { totals: q.priced.totals, coupon: q.coupon }))
}

pub async fn create_checkout_session(State(s): State<AppState>, Json(r): Json<CheckoutSessionRequest>) -> Result<(StatusCode, Json<CheckoutSessionResponse>), ApiError> {
    if r.delivery_address.is_null() { return Err(ApiError::Validation("delivery_address is required".to_string())); }
    let q = authoritative_quote(&s, &r.items, r.coupon_code.as_deref()).await?;
    let totals = q.priced.totals;
    let drifted = r.client_total.filter(|t| *t != totals.total);
    if let Some(client_total) = drifted {
        tracing::warn!(%client_total, total = %totals.total, "client total differs from authoritative total, correcting");
    }
    let adjusted = drifted.is_some();
    let session_id = Uuid::now_v7();
    tracing::info!(%session_id, total = %totals.total, coupon = ?q.applied_code, "checkout session created");
    s.events.publish(vec![DomainEvent::Checkout(CheckoutEvent::SessionCreated { session_id, total: totals.total, coupon_code: q.applied_code })]).await;
    Ok((StatusCode::CREATED, Json(CheckoutSessionResponse { session_id, totals, coupon: q.coupon, adjusted })))
}
