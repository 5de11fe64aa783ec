//! PDF rendering of voucher pages.
//!
//! The worker only depends on [`VoucherRenderer`]; page layout lives in the
//! Typst template under `static/`.

pub mod common;
pub mod typst;

pub use typst::TypstVoucherRenderer;

use thiserror::Error;

use crate::voucher::models::VoucherRequest;

/// Errors that can occur while rendering a page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load Typst template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// One rendered voucher page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-based page number.
    pub page: u32,
    pub pdf: Vec<u8>,
}

/// Renders one page of a voucher. Called once per page, in page order.
pub trait VoucherRenderer: Send + Sync {
    fn render(&self, request: &VoucherRequest, page: u32) -> Result<RenderedPage, RenderError>;
}
