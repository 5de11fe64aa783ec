use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Store, StoreDocument, StoreError};
use crate::config::Config;
use crate::issuer::models::Issuer;
use crate::voucher::models::VoucherDetails;

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_issuers(&self) -> Result<Vec<Issuer>, StoreError> {
        Ok(self.document.read().issuers.clone())
    }

    async fn add_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError> {
        self.document.write().add_issuer(issuer)
    }

    async fn remove_issuers(&self, initials: &[String]) -> Result<usize, StoreError> {
        Ok(self.document.write().remove_issuers(initials))
    }

    async fn increment_voucher_count(&self, initials: &str) -> Result<Issuer, StoreError> {
        self.document.write().increment_voucher_count(initials)
    }

    async fn list_vouchers(&self) -> Result<Vec<VoucherDetails>, StoreError> {
        Ok(self.document.read().vouchers.clone())
    }

    async fn append_voucher(&self, voucher: VoucherDetails) -> Result<(), StoreError> {
        self.document.write().vouchers.push(voucher);
        Ok(())
    }

    async fn remove_voucher(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.document.write().remove_voucher(id))
    }

    async fn get_config(&self) -> Result<Option<Config>, StoreError> {
        Ok(self.document.read().config.clone())
    }

    async fn set_config(&self, config: Config) -> Result<(), StoreError> {
        self.document.write().config = Some(config);
        Ok(())
    }
}
