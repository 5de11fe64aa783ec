//! Voucher generation jobs: registry, worker, progress notifications and
//! status derivation.

pub mod handlers;
pub mod progress;
pub mod registry;
pub mod status;
pub mod worker;

pub use progress::{ChannelObserver, ObserverId, ProgressChannel, ProgressEvent, ProgressObserver};
pub use registry::{Job, JobRegistry, JobView};
pub use status::JobStatus;
pub use worker::{GenerationTask, GenerationWorker};
