//! Store backed by a single JSON document on disk.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreDocument, StoreError};
use crate::config::Config;
use crate::issuer::models::Issuer;
use crate::voucher::models::VoucherDetails;

/// JSON file store. Every mutation rewrites the whole document through a
/// temporary file and a rename, while holding the document lock.
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let document = if path.exists() {
            let raw = fs::read(&path)?;
            if raw.iter().all(|b| b.is_ascii_whitespace()) {
                StoreDocument::default()
            } else {
                serde_json::from_slice(&raw)?
            }
        } else {
            StoreDocument::default()
        };

        log::info!(
            "Opened store at {} ({} issuers, {} vouchers)",
            path.display(),
            document.issuers.len(),
            document.vouchers.len()
        );

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let mut current = self.document.lock().await;
        let mut next = current.clone();
        let out = apply(&mut next)?;
        self.persist(&next).await?;
        *current = next;
        Ok(out)
    }

    async fn persist(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        log::debug!("Store persisted to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn list_issuers(&self) -> Result<Vec<Issuer>, StoreError> {
        Ok(self.document.lock().await.issuers.clone())
    }

    async fn add_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError> {
        self.mutate(|doc| doc.add_issuer(issuer)).await
    }

    async fn remove_issuers(&self, initials: &[String]) -> Result<usize, StoreError> {
        self.mutate(|doc| Ok(doc.remove_issuers(initials))).await
    }

    async fn increment_voucher_count(&self, initials: &str) -> Result<Issuer, StoreError> {
        self.mutate(|doc| doc.increment_voucher_count(initials)).await
    }

    async fn list_vouchers(&self) -> Result<Vec<VoucherDetails>, StoreError> {
        Ok(self.document.lock().await.vouchers.clone())
    }

    async fn append_voucher(&self, voucher: VoucherDetails) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.vouchers.push(voucher);
            Ok(())
        })
        .await
    }

    async fn remove_voucher(&self, id: Uuid) -> Result<bool, StoreError> {
        self.mutate(|doc| Ok(doc.remove_voucher(id))).await
    }

    async fn get_config(&self) -> Result<Option<Config>, StoreError> {
        Ok(self.document.lock().await.config.clone())
    }

    async fn set_config(&self, config: Config) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.config = Some(config);
            Ok(())
        })
        .await
    }
}
