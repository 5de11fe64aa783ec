//! Voucher submission, catalog listing and deletion.

pub mod handlers;
pub mod models;
pub mod service;
pub mod validation;

pub use handlers::config;
pub use models::{VoucherDetails, VoucherRequest};
pub use service::{DeleteOutcome, Submission, VoucherService};
