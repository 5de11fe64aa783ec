//! Crate-wide error type and its HTTP mapping.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use uuid::Uuid;

use crate::platform::PlatformError;
use crate::store::StoreError;
use crate::ErrorResponse;

/// Errors surfaced by the voucher core and the request layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("issuer '{0}' does not exist")]
    UnknownIssuer(String),
    #[error("an issuer with initials '{0}' already exists")]
    DuplicateIssuer(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid progress {requested} for job {job_id} (current {current}, total {total})")]
    InvalidProgress {
        job_id: Uuid,
        requested: u32,
        current: u32,
        total: u32,
    },
    #[error("failed to render page {page}: {message}")]
    RenderFailure { page: u32, message: String },
    #[error("store failure: {0}")]
    StoreFailure(#[source] StoreError),
    #[error("io failure: {0}")]
    IoFailure(String),
}

impl AppError {
    /// Short machine-readable name used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::UnknownIssuer(_) => "UnknownIssuer",
            AppError::DuplicateIssuer(_) => "DuplicateIssuer",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidProgress { .. } => "InvalidProgress",
            AppError::RenderFailure { .. } => "RenderFailure",
            AppError::StoreFailure(_) => "StoreFailure",
            AppError::IoFailure(_) => "IOFailure",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IssuerNotFound(initials) => AppError::UnknownIssuer(initials),
            StoreError::DuplicateIssuer(initials) => AppError::DuplicateIssuer(initials),
            other => AppError::StoreFailure(other),
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        AppError::IoFailure(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownIssuer(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateIssuer(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidProgress { .. } => StatusCode::CONFLICT,
            AppError::RenderFailure { .. }
            | AppError::StoreFailure(_)
            | AppError::IoFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ErrorResponse::new(self.kind(), &self.to_string()))
    }
}
