//! In-memory registry of generation jobs.
//!
//! Jobs live for the lifetime of the process only; nothing is persisted, so a
//! restart forgets every job (rendered vouchers stay in the store).

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::JobStatus;
use crate::error::AppError;

/// One voucher generation, tracked by page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub total_pages: u32,
    pub completed_pages: u32,
}

impl Job {
    pub fn status(&self) -> JobStatus {
        JobStatus::derive(self.completed_pages, self.total_pages)
    }

    pub fn is_terminal(&self) -> bool {
        self.completed_pages == self.total_pages
    }
}

/// Job as returned to the UI, with its derived status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: Uuid,
    pub total_pages: u32,
    pub completed_pages: u32,
    pub status: JobStatus,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let status = job.status();
        Self {
            id: job.id,
            total_pages: job.total_pages,
            completed_pages: job.completed_pages,
            status,
        }
    }
}

#[derive(Default)]
struct JobTable {
    order: Vec<Uuid>,
    jobs: HashMap<Uuid, Job>,
}

/// Concurrency-safe job table shared by the submission path, the workers and
/// the read path.
#[derive(Default)]
pub struct JobRegistry {
    table: RwLock<JobTable>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job with no completed pages and return its id.
    pub fn create_job(&self, total_pages: u32) -> Uuid {
        let mut table = self.table.write();
        let mut id = Uuid::new_v4();
        while table.jobs.contains_key(&id) {
            id = Uuid::new_v4();
        }

        table.jobs.insert(
            id,
            Job {
                id,
                total_pages,
                completed_pages: 0,
            },
        );
        table.order.push(id);
        log::debug!("Created job {} ({} pages)", id, total_pages);
        id
    }

    /// Move a job forward. Progress never goes backwards and never passes
    /// the job's page total.
    pub fn report_progress(&self, job_id: Uuid, completed_pages: u32) -> Result<Job, AppError> {
        let mut table = self.table.write();
        let job = table
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))?;

        if completed_pages < job.completed_pages || completed_pages > job.total_pages {
            return Err(AppError::InvalidProgress {
                job_id,
                requested: completed_pages,
                current: job.completed_pages,
                total: job.total_pages,
            });
        }

        job.completed_pages = completed_pages;
        Ok(job.clone())
    }

    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.table.read().jobs.get(&job_id).cloned()
    }

    /// Snapshot of every job in insertion order.
    pub fn list_jobs(&self) -> Vec<Job> {
        let table = self.table.read();
        table
            .order
            .iter()
            .filter_map(|id| table.jobs.get(id).cloned())
            .collect()
    }
}
