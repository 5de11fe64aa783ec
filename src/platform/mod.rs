//! Thin wrappers around the operating system: printers, the PDF viewer and
//! the directory picker.
//!
//! Every call blocks on a child process; handlers run them through
//! `web::block`.

pub mod handlers;
mod system;

pub use system::{parse_lpstat_printers, SystemDesktop};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with status {code}")]
    Exit { command: String, code: i32 },
    #[error("nothing to print at {0}")]
    NothingToPrint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub device_id: String,
    pub name: String,
}

pub trait Desktop: Send + Sync {
    fn list_printers(&self) -> Result<Vec<Printer>, PlatformError>;

    /// Print the given files, in order, on one printer.
    fn print(&self, printer_id: &str, files: &[PathBuf]) -> Result<(), PlatformError>;

    /// Open a file or directory in the system viewer.
    fn open(&self, path: &Path) -> Result<(), PlatformError>;

    /// Ask the user for a directory. `None` when the dialog is cancelled.
    fn pick_directory(&self) -> Result<Option<PathBuf>, PlatformError>;
}
