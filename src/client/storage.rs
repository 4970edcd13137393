//! Persistence for the applied-coupon hint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::ClientError;
use crate::domain::value_objects::{CouponCode, DiscountRate, Money};

/// Bumped whenever the cached shape changes; older entries are dropped.
pub const CACHE_VERSION: u32 = 1;

/// What the storefront remembers about a coupon between pages.
///
/// This is a prefill hint only. It is revalidated against the server and
/// the current subtotal before it affects any displayed total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCoupon {
    pub version: u32,
    pub applied: AppliedCoupon,
}

impl CachedCoupon {
    pub fn new(applied: AppliedCoupon) -> Self { Self { version: CACHE_VERSION, applied } }
}

pub trait CouponStorage: Send {
    fn load(&self) -> Result<Option<AppliedCoupon>, ClientError>;
    fn save(&mut self, applied: &AppliedCoupon) -> Result<(), ClientError>;
    fn clear(&mut self) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryCouponStorage {
    entry: Option<CachedCoupon>,
}

impl CouponStorage for MemoryCouponStorage {
    fn load(&self) -> Result<Option<AppliedCoupon>, ClientError> {
        Ok(self.entry.as_ref().filter(|e| e.version == CACHE_VERSION).map(|e| e.applied.clone()))
    }
    fn save(&mut self, applied: &AppliedCoupon) -> Result<(), ClientError> {
        self.entry = Some(CachedCoupon::new(applied.clone()));
        Ok(())
    }
    fn clear(&mut self) -> Result<(), ClientError> {
        self.entry = None;
        Ok(())
    }
}

/// Stores the entry as a JSON file. Unreadable or outdated files are
/// treated as empty.
#[derive(Debug, Clone)]
pub struct FileCouponStorage {
    path: PathBuf,
}

impl FileCouponStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
    pub fn path(&self) -> &Path { &self.path }
}

impl CouponStorage for FileCouponStorage {
    fn load(&self) -> Result<Option<AppliedCoupon>, ClientError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<CachedCoupon>(&bytes) {
            Ok(entry) if entry.version == CACHE_VERSION => Ok(Some(entry.applied)),
            Ok(entry) => {
                tracing::debug!(version = entry.version, "discarding outdated coupon cache");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable coupon cache");
                Ok(None)
            }
        }
    }

    fn save(&mut self, applied: &AppliedCoupon) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(&CachedCoupon::new(applied.clone()))?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn applied() -> AppliedCoupon {
        AppliedCoupon {
            code: CouponCode::new("WELCOME10").unwrap(),
            discount_rate: DiscountRate::new(Decimal::TEN).unwrap(),
            discount_amount: Money::from_cents(1100),
        }
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryCouponStorage::default();
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&applied()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(applied()));
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileCouponStorage::new(dir.path().join("appliedCoupon.json"));
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&applied()).unwrap();
        let reopened = FileCouponStorage::new(storage.path());
        assert_eq!(reopened.load().unwrap(), Some(applied()));
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_drops_outdated_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appliedCoupon.json");
        std::fs::write(&path, r#"{"version":0,"applied":{"code":"OLD","discount_rate":10.0,"discount_amount":5.0}}"#).unwrap();
        assert_eq!(FileCouponStorage::new(&path).load().unwrap(), None);
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileCouponStorage::new(&path).load().unwrap(), None);
    }
}
