//! HTTP surface of the pricing service.

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::pricing::PricingPolicy;
use crate::publisher::EventPublisher;
use crate::store::{CatalogStore, CouponStore};

pub mod admin;
pub mod checkout;
pub mod coupons;
pub mod dto;
pub mod error;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub coupons: Arc<dyn CouponStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub events: EventPublisher,
    pub policy: PricingPolicy,
}

impl AppState {
    pub fn new(coupons: Arc<dyn CouponStore>, catalog: Arc<dyn CatalogStore>, events: EventPublisher) -> Self {
        Self { coupons, catalog, events, policy: PricingPolicy::default() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-pricing"})) }))
        .route("/api/coupons/validate", get(coupons::validate_coupon))
        .route("/api/pricing/quote", post(checkout::quote))
        .route("/api/orders/create-checkout-session", post(checkout::create_checkout_session))
        .route("/api/admin/coupons", get(admin::list_coupons).post(admin::create_coupon))
        .route("/api/admin/coupons/:id", get(admin::get_coupon).patch(admin::update_coupon).delete(admin::delete_coupon))
        .route("/api/admin/coupons/:id/toggle", patch(admin::toggle_coupon))
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::{get, state_with};
    use crate::store::{MockCatalogStore, MockCouponStore};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(state_with(MockCouponStore::new(), MockCatalogStore::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
