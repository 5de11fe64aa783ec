//! Persistent key-value store holding issuers, vouchers and the config.
//!
//! Three independent collections live in one [`StoreDocument`]:
//! - `issuers` - list of [`Issuer`]
//! - `vouchers` - list of [`VoucherDetails`]
//! - `config` - a single [`Config`]
//!
//! There are no cross-collection transactions. Each mutating call is applied
//! under the implementation's lock, which makes the per-issuer
//! read-increment-write atomic.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::issuer::models::{normalize_initials, Issuer};
use crate::voucher::models::VoucherDetails;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("issuer '{0}' not found")]
    IssuerNotFound(String),
    #[error("issuer '{0}' already exists")]
    DuplicateIssuer(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_issuers(&self) -> Result<Vec<Issuer>, StoreError>;

    /// Insert a new issuer. Initials must be unique.
    async fn add_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError>;

    /// Remove every issuer whose initials are listed. Returns how many were removed.
    async fn remove_issuers(&self, initials: &[String]) -> Result<usize, StoreError>;

    /// Atomically bump the voucher count of one issuer and return the updated record.
    async fn increment_voucher_count(&self, initials: &str) -> Result<Issuer, StoreError>;

    async fn list_vouchers(&self) -> Result<Vec<VoucherDetails>, StoreError>;

    async fn append_voucher(&self, voucher: VoucherDetails) -> Result<(), StoreError>;

    /// Remove a voucher record. Returns `false` when no record had that id.
    async fn remove_voucher(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn get_config(&self) -> Result<Option<Config>, StoreError>;

    async fn set_config(&self, config: Config) -> Result<(), StoreError>;
}

/// On-disk layout shared by every store implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub issuers: Vec<Issuer>,
    #[serde(default)]
    pub vouchers: Vec<VoucherDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
}

impl StoreDocument {
    fn add_issuer(&mut self, issuer: Issuer) -> Result<Issuer, StoreError> {
        if self.issuers.iter().any(|i| i.initials == issuer.initials) {
            return Err(StoreError::DuplicateIssuer(issuer.initials));
        }
        self.issuers.push(issuer.clone());
        Ok(issuer)
    }

    fn remove_issuers(&mut self, initials: &[String]) -> usize {
        let targets: Vec<String> = initials.iter().map(|i| normalize_initials(i)).collect();
        let before = self.issuers.len();
        self.issuers.retain(|issuer| !targets.contains(&issuer.initials));
        before - self.issuers.len()
    }

    fn increment_voucher_count(&mut self, initials: &str) -> Result<Issuer, StoreError> {
        let wanted = normalize_initials(initials);
        let issuer = self
            .issuers
            .iter_mut()
            .find(|issuer| issuer.initials == wanted)
            .ok_or(StoreError::IssuerNotFound(wanted))?;
        issuer.voucher_count += 1;
        Ok(issuer.clone())
    }

    fn remove_voucher(&mut self, id: Uuid) -> bool {
        let before = self.vouchers.len();
        self.vouchers.retain(|voucher| voucher.id != id);
        before != self.vouchers.len()
    }
}
