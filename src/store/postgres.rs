//! Postgres-backed stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, CouponParts, CouponTerms};
use crate::domain::value_objects::{CouponCode, DiscountRate, Money};
use crate::store::{CatalogStore, CouponStore, StoreError};

const COUPON_COLUMNS: &str = "id, code, discount_rate, min_subtotal, expires_at, is_active, deleted_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRecord {
    id: Uuid, code: String, discount_rate: Decimal, min_subtotal: Decimal,
    expires_at: Option<DateTime<Utc>>, is_active: bool, deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = StoreError;
    fn try_from(r: CouponRecord) -> Result<Self, Self::Error> {
        let code = CouponCode::new(r.code).map_err(|e| StoreError::Corrupt(format!("coupon {}: {e}", r.id)))?;
        let discount_rate = DiscountRate::new(r.discount_rate).map_err(|e| StoreError::Corrupt(format!("coupon {}: {e}", r.id)))?;
        Ok(Coupon::restore(CouponParts {
            id: r.id,
            terms: CouponTerms { code, discount_rate, min_subtotal: Money::new(r.min_subtotal), is_active: r.is_active, expires_at: r.expires_at },
            deleted_at: r.deleted_at, created_at: r.created_at, updated_at: r.updated_at,
        }))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRecord { id: Uuid, price: Decimal }

fn map_unique(code: &CouponCode) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() { return StoreError::DuplicateCode(code.clone()); }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl CouponStore for PgStore {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, CouponRecord>(&sql).bind(code.as_str()).fetch_optional(&self.db).await?
            .map(Coupon::try_from).transpose()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Coupon>, StoreError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, CouponRecord>(&sql).bind(id).fetch_optional(&self.db).await?
            .map(Coupon::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Coupon>, StoreError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE deleted_at IS NULL ORDER BY created_at DESC");
        sqlx::query_as::<_, CouponRecord>(&sql).fetch_all(&self.db).await?
            .into_iter().map(Coupon::try_from).collect()
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), StoreError> {
        let t = coupon.terms();
        sqlx::query("INSERT INTO coupons (id, code, discount_rate, min_subtotal, expires_at, is_active, deleted_at, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
            .bind(coupon.id()).bind(t.code.as_str()).bind(t.discount_rate.percent()).bind(t.min_subtotal.amount())
            .bind(t.expires_at).bind(t.is_active).bind(coupon.deleted_at()).bind(coupon.created_at()).bind(coupon.updated_at())
            .execute(&self.db).await.map_err(map_unique(&t.code))?;
        Ok(())
    }

    async fn save(&self, coupon: &Coupon) -> Result<(), StoreError> {
        let t = coupon.terms();
        sqlx::query("UPDATE coupons SET discount_rate = $2, min_subtotal = $3, expires_at = $4, is_active = $5, deleted_at = $6, updated_at = $7 WHERE id = $1")
            .bind(coupon.id()).bind(t.discount_rate.percent()).bind(t.min_subtotal.amount())
            .bind(t.expires_at).bind(t.is_active).bind(coupon.deleted_at()).bind(coupon.updated_at())
            .execute(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn unit_prices(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Money>, StoreError> {
        let rows = sqlx::query_as::<_, PriceRecord>("SELECT id, price FROM products WHERE id = ANY($1) AND status = 'active'")
            .bind(ids).fetch_all(&self.db).await?;
        Ok(rows.into_iter().map(|r| (r.id, Money::new(r.price))).collect())
    }
}
