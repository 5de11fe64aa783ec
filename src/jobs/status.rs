use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display status of a job, derived from its page counters on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum JobStatus {
    NotStarted,
    Generating,
    Complete,
}

impl JobStatus {
    /// `Complete` is checked first so a zero-page job reads as complete.
    pub fn derive(completed_pages: u32, total_pages: u32) -> Self {
        if completed_pages == total_pages {
            JobStatus::Complete
        } else if completed_pages > 0 {
            JobStatus::Generating
        } else {
            JobStatus::NotStarted
        }
    }
}
