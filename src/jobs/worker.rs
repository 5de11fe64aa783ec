//! Generation worker: renders every page of one voucher and advances its job.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use uuid::Uuid;

use super::progress::{ProgressChannel, ProgressEvent};
use super::registry::JobRegistry;
use crate::error::AppError;
use crate::render::common::page_filename;
use crate::render::VoucherRenderer;
use crate::store::Store;
use crate::voucher::models::{GeneratedTime, VoucherDetails, VoucherRequest};

/// Unit of work handed from the submission path to a worker.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub job_id: Uuid,
    pub voucher_id: Uuid,
    pub request: VoucherRequest,
    /// Output root snapshotted from the config when the job was accepted.
    pub output_root: PathBuf,
}

impl GenerationTask {
    pub fn voucher_dir(&self) -> PathBuf {
        self.output_root.join(self.voucher_id.to_string())
    }
}

#[derive(Clone)]
pub struct GenerationWorker {
    registry: Arc<JobRegistry>,
    progress: Arc<ProgressChannel>,
    store: Arc<dyn Store>,
    renderer: Arc<dyn VoucherRenderer>,
}

impl GenerationWorker {
    pub fn new(
        registry: Arc<JobRegistry>,
        progress: Arc<ProgressChannel>,
        store: Arc<dyn Store>,
        renderer: Arc<dyn VoucherRenderer>,
    ) -> Self {
        Self {
            registry,
            progress,
            store,
            renderer,
        }
    }

    /// Render pages `1..=count` in order, reporting progress after each one.
    ///
    /// The first failing page stops the run; earlier pages stay on disk and
    /// the job keeps its last successful progress. On success one
    /// [`VoucherDetails`] record is appended to the store.
    pub async fn run(&self, task: GenerationTask) -> Result<VoucherDetails, AppError> {
        let total_pages = task.request.count;
        let voucher_dir = task.voucher_dir();

        tokio::fs::create_dir_all(&voucher_dir)
            .await
            .map_err(|e| AppError::IoFailure(format!("{}: {}", voucher_dir.display(), e)))?;

        log::info!(
            "Job {} started: {} page(s) for flight {} into {}",
            task.job_id,
            total_pages,
            task.request.flight_number,
            voucher_dir.display()
        );

        for page in 1..=total_pages {
            let renderer = self.renderer.clone();
            let request = task.request.clone();
            let rendered = tokio::task::spawn_blocking(move || renderer.render(&request, page))
                .await
                .map_err(|e| AppError::RenderFailure {
                    page,
                    message: e.to_string(),
                })?
                .map_err(|e| AppError::RenderFailure {
                    page,
                    message: e.to_string(),
                })?;

            let path = voucher_dir.join(page_filename(&task.request, rendered.page));
            tokio::fs::write(&path, &rendered.pdf)
                .await
                .map_err(|e| AppError::RenderFailure {
                    page,
                    message: format!("could not write {}: {}", path.display(), e),
                })?;

            let job = self.registry.report_progress(task.job_id, page)?;
            log::debug!("Job {} rendered page {}/{}", job.id, page, total_pages);
            self.progress.publish(ProgressEvent {
                job_id: job.id,
                current_page: job.completed_pages,
                total_pages: job.total_pages,
            });
        }

        let details = VoucherDetails {
            id: task.voucher_id,
            issuer: task.request.issuer.initials.clone(),
            flight_number: task.request.flight_number.clone(),
            output_dir: voucher_dir.to_string_lossy().into_owned(),
            generated_time: GeneratedTime::from_datetime(&Local::now()),
        };
        self.store.append_voucher(details.clone()).await?;

        log::info!("Job {} complete, voucher {} recorded", task.job_id, details.id);
        Ok(details)
    }
}
