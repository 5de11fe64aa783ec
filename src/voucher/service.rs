//! Voucher submission and catalog operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::web;
use serde::Serialize;
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::VoucherDetails;
use super::validation::parse_voucher_request;
use crate::config;
use crate::error::AppError;
use crate::jobs::{GenerationTask, GenerationWorker, JobRegistry};
use crate::store::Store;

/// An accepted submission. `completion` resolves when the worker finishes.
#[derive(Debug)]
pub struct Submission {
    pub job_id: Uuid,
    pub voucher_id: Uuid,
    pub completion: JoinHandle<Result<VoucherDetails, AppError>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteOutcome {
    pub id: Uuid,
    /// Set when the files could not be removed; the record is gone regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct VoucherService {
    store: Arc<dyn Store>,
    registry: Arc<JobRegistry>,
    worker: GenerationWorker,
}

impl VoucherService {
    pub fn new(store: Arc<dyn Store>, registry: Arc<JobRegistry>, worker: GenerationWorker) -> Self {
        Self {
            store,
            registry,
            worker,
        }
    }

    /// Validate a serialized voucher, count it against its issuer, create
    /// its job and hand it to a background worker.
    ///
    /// Returns as soon as the job exists; rendering has not started yet.
    pub async fn submit(&self, raw: &str) -> Result<Submission, AppError> {
        let request = parse_voucher_request(raw).inspect_err(|e| {
            log::warn!("Rejected voucher submission: {}", e);
        })?;

        let issuer = self
            .store
            .increment_voucher_count(&request.issuer.initials)
            .await
            .map_err(|e| {
                log::error!("Could not update issuer {}: {}", request.issuer.initials, e);
                AppError::from(e)
            })?;

        let config = config::resolve(self.store.as_ref()).await;
        let job_id = self.registry.create_job(request.count);
        let voucher_id = Uuid::new_v4();

        log::info!(
            "Accepted voucher {} for flight {} by {} ({} issued): job {}, {} page(s)",
            voucher_id,
            request.flight_number,
            issuer.initials,
            issuer.voucher_count,
            job_id,
            request.count
        );

        let task = GenerationTask {
            job_id,
            voucher_id,
            request,
            output_root: config.output_root().to_path_buf(),
        };
        let worker = self.worker.clone();
        let completion = tokio::spawn(async move {
            let result = worker.run(task).await;
            if let Err(e) = &result {
                log::error!("Job {} stopped: {}", job_id, e);
            }
            result
        });

        Ok(Submission {
            job_id,
            voucher_id,
            completion,
        })
    }

    pub async fn list_vouchers(&self) -> Result<Vec<VoucherDetails>, AppError> {
        Ok(self.store.list_vouchers().await?)
    }

    pub async fn find_voucher(&self, id: Uuid) -> Result<VoucherDetails, AppError> {
        self.store
            .list_vouchers()
            .await?
            .into_iter()
            .find(|voucher| voucher.id == id)
            .ok_or_else(|| AppError::NotFound(format!("voucher {id}")))
    }

    /// Remove a voucher's files (best effort) and its catalog record (always).
    pub async fn delete_voucher(&self, id: Uuid) -> Result<DeleteOutcome, AppError> {
        let voucher = self.find_voucher(id).await?;

        let warning = match remove_output(Path::new(&voucher.output_dir)).await {
            Ok(()) => None,
            Err(e) => {
                log::warn!(
                    "Voucher {} files at {} could not be deleted: {}",
                    id,
                    voucher.output_dir,
                    e
                );
                Some(format!("voucher files could not be deleted: {e}"))
            }
        };

        self.store.remove_voucher(id).await?;
        log::info!("Voucher {} removed from the catalog", id);
        Ok(DeleteOutcome { id, warning })
    }

    /// A voucher record with its page files in page order. The directory
    /// scan runs on the blocking pool.
    pub async fn voucher_files(&self, id: Uuid) -> Result<(VoucherDetails, Vec<PathBuf>), AppError> {
        let voucher = self.find_voucher(id).await?;
        let output = PathBuf::from(&voucher.output_dir);
        let pages = web::block(move || voucher_pages(&output))
            .await
            .map_err(|e| AppError::IoFailure(e.to_string()))?
            .map_err(|e| AppError::IoFailure(format!("{}: {}", voucher.output_dir, e)))?;
        Ok((voucher, pages))
    }

    /// Path of one rendered page (1-based) of a voucher.
    pub async fn page_path(&self, id: Uuid, page: usize) -> Result<PathBuf, AppError> {
        let (_, pages) = self.voucher_files(id).await?;
        page.checked_sub(1)
            .and_then(|index| pages.get(index).cloned())
            .ok_or_else(|| AppError::NotFound(format!("page {page} of voucher {id}")))
    }
}

async fn remove_output(path: &Path) -> std::io::Result<()> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    }
}

/// PDF files of a voucher in page order. A plain file is its own single page.
pub fn voucher_pages(output: &Path) -> std::io::Result<Vec<PathBuf>> {
    if output.is_file() {
        return Ok(vec![output.to_path_buf()]);
    }

    let mut pages: Vec<PathBuf> = std::fs::read_dir(output)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pages.sort_by_key(|path| (page_number(path), path.clone()));
    Ok(pages)
}

fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}
