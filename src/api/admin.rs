//! Admin coupon management. Field validation only; no pricing rules here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::{CouponView, CreateCouponRequest, DeleteParams, UpdateCouponRequest};
use crate::api::{ApiError, AppState};
use crate::domain::aggregates::{Coupon, CouponChanges};
use crate::domain::events::{CouponEvent, DomainEvent};
use crate::domain::value_objects::{CouponCode, DiscountRate, Money};

fn field<T, E: std::fmt::Display>(name: &str, value: Result<T, E>) -> Result<T, ApiError> {
    value.map_err(|e| ApiError::Validation(format!("{name}: {e}")))
}

async fn load(s: &AppState, id: Uuid) -> Result<Coupon, ApiError> {
    s.coupons.get(id).await?.ok_or(ApiError::NotFound("coupon"))
}

pub async fn list_coupons(State(s): State<AppState>) -> Result<Json<Vec<CouponView>>, ApiError> {
    Ok(Json(s.coupons.list().await?.iter().map(CouponView::from).collect()))
}

pub async fn get_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CouponView>, ApiError> {
    Ok(Json(CouponView::from(&load(&s, id).await?)))
}

pub async fn create_coupon(State(s): State<AppState>, Json(r): Json<CreateCouponRequest>) -> Result<(StatusCode, Json<CouponView>), ApiError> {
    r.validate()?;
    let code = field("code", CouponCode::new(&r.code))?;
    let rate = field("discount_rate", DiscountRate::try_from(r.discount_rate))?;
    let min_subtotal = field("min_subtotal", Money::try_from(r.min_subtotal))?;
    let mut coupon = Coupon::create(code, rate, min_subtotal, r.expires_at)?;
    if r.is_active == Some(false) { coupon.toggle_active()?; }
    s.coupons.insert(&coupon).await?;
    tracing::info!(coupon_id = %coupon.id(), code = %coupon.code(), "coupon created");
    s.events.publish(coupon.take_events()).await;
    Ok((StatusCode::CREATED, Json(CouponView::from(&coupon))))
}

pub async fn update_coupon(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<UpdateCouponRequest>) -> Result<Json<CouponView>, ApiError> {
    r.validate()?;
    let changes = CouponChanges {
        discount_rate: r.discount_rate.map(DiscountRate::try_from).transpose().map_err(|e| ApiError::Validation(format!("discount_rate: {e}")))?,
        min_subtotal: r.min_subtotal.map(Money::try_from).transpose().map_err(|e| ApiError::Validation(format!("min_subtotal: {e}")))?,
        expires_at: if r.clear_expiry { Some(None) } else { r.expires_at.map(Some) },
        is_active: r.is_active,
    };
    let mut coupon = load(&s, id).await?;
    coupon.update(changes)?;
    s.coupons.save(&coupon).await?;
    s.events.publish(coupon.take_events()).await;
    Ok(Json(CouponView::from(&coupon)))
}

pub async fn toggle_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CouponView>, ApiError> {
    let mut coupon = load(&s, id).await?;
    let active = coupon.toggle_active()?;
    s.coupons.save(&coupon).await?;
    tracing::info!(coupon_id = %id, active, "coupon toggled");
    s.events.publish(coupon.take_events()).await;
    Ok(Json(CouponView::from(&coupon)))
}

pub async fn delete_coupon(State(s): State<AppState>, Path(id): Path<Uuid>, Query(p): Query<DeleteParams>) -> Result<StatusCode, ApiError> {
    if p.hard.unwrap_or(false) {
        if !s.coupons.delete(id).await? { return Err(ApiError::NotFound("coupon")); }
        s.events.publish(vec![DomainEvent::Coupon(CouponEvent::Deleted { coupon_id: id, hard: true })]).await;
    } else {
        let mut coupon = load(&s, id).await?;
        coupon.soft_delete()?;
        s.coupons.save(&coupon).await?;
        s.events.publish(coupon.take_events()).await;
    }
    tracing::info!(coupon_id = %id, hard = p.hard.unwrap_or(false), "coupon deleted");
    Ok(StatusCode::NO_CONTENT)
}
