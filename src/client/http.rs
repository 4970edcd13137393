//! HTTP transport for coupon validation.

use async_trait::async_trait;

use crate::api::dto::ValidateResponse;
use crate::client::{ClientError, ValidationClient};
use crate::domain::value_objects::{CouponCode, Money};

#[derive(Debug, Clone)]
pub struct HttpValidationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpValidationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn validate_url(&self) -> String { format!("{}/api/coupons/validate", self.base_url) }
}

#[async_trait]
impl ValidationClient for HttpValidationClient {
    async fn validate(&self, code: &CouponCode, subtotal: Money) -> Result<ValidateResponse, ClientError> {
        let subtotal = subtotal.to_string();
        let response = self.http.get(self.validate_url())
            .query(&[("code", code.as_str()), ("subtotal", subtotal.as_str())])
            .send().await?;
        let status = response.status();
        if !status.is_success() { return Err(ClientError::Status(status.as_u16())); }
        Ok(response.json::<ValidateResponse>().await?)
    }
}
