#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;

use voucher_desk::config::Config;
use voucher_desk::issuer::Issuer;
use voucher_desk::platform::{Desktop, PlatformError, Printer};
use voucher_desk::render::{RenderError, RenderedPage, VoucherRenderer};
use voucher_desk::store::{MemoryStore, Store, StoreError};
use voucher_desk::voucher::{VoucherDetails, VoucherRequest};
use voucher_desk::AppState;

/// Renderer that emits a tiny fake PDF, optionally failing on one page.
#[derive(Default)]
pub struct FakeRenderer {
    pub fail_on_page: Option<u32>,
    pub rendered: Mutex<Vec<u32>>,
}

impl FakeRenderer {
    pub fn failing_on(page: u32) -> Self {
        Self {
            fail_on_page: Some(page),
            rendered: Mutex::new(Vec::new()),
        }
    }
}

impl VoucherRenderer for FakeRenderer {
    fn render(&self, request: &VoucherRequest, page: u32) -> Result<RenderedPage, RenderError> {
        if self.fail_on_page == Some(page) {
            return Err(RenderError::Other(format!("page {page} exploded")));
        }
        self.rendered.lock().push(page);
        Ok(RenderedPage {
            page,
            pdf: format!("%PDF {} page {}", request.flight_number, page).into_bytes(),
        })
    }
}

#[derive(Default)]
pub struct FakeDesktop {
    pub printed: Mutex<Vec<(String, Vec<PathBuf>)>>,
    pub opened: Mutex<Vec<PathBuf>>,
    pub picked: Option<PathBuf>,
}

impl Desktop for FakeDesktop {
    fn list_printers(&self) -> Result<Vec<Printer>, PlatformError> {
        Ok(vec![Printer {
            device_id: "Gate3".to_string(),
            name: "Gate3".to_string(),
        }])
    }

    fn print(&self, printer_id: &str, files: &[PathBuf]) -> Result<(), PlatformError> {
        self.printed
            .lock()
            .push((printer_id.to_string(), files.to_vec()));
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<(), PlatformError> {
        self.opened.lock().push(path.to_path_buf());
        Ok(())
    }

    fn pick_directory(&self) -> Result<Option<PathBuf>, PlatformError> {
        Ok(self.picked.clone())
    }
}

/// Store whose every operation fails with an I/O error.
pub struct FailingStore;

fn broken() -> StoreError {
    StoreError::Io(std::io::Error::other("disk unavailable"))
}

#[async_trait]
impl Store for FailingStore {
    async fn list_issuers(&self) -> Result<Vec<Issuer>, StoreError> {
        Err(broken())
    }

    async fn add_issuer(&self, _issuer: Issuer) -> Result<Issuer, StoreError> {
        Err(broken())
    }

    async fn remove_issuers(&self, _initials: &[String]) -> Result<usize, StoreError> {
        Err(broken())
    }

    async fn increment_voucher_count(&self, _initials: &str) -> Result<Issuer, StoreError> {
        Err(broken())
    }

    async fn list_vouchers(&self) -> Result<Vec<VoucherDetails>, StoreError> {
        Err(broken())
    }

    async fn append_voucher(&self, _voucher: VoucherDetails) -> Result<(), StoreError> {
        Err(broken())
    }

    async fn remove_voucher(&self, _id: Uuid) -> Result<bool, StoreError> {
        Err(broken())
    }

    async fn get_config(&self) -> Result<Option<Config>, StoreError> {
        Err(broken())
    }

    async fn set_config(&self, _config: Config) -> Result<(), StoreError> {
        Err(broken())
    }
}

/// Memory store seeded with Jane Doe (JD) and an output directory.
pub async fn seeded_store(output_dir: &Path) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .add_issuer(Issuer::new("Jane Doe", "JD"))
        .await
        .unwrap();
    store
        .set_config(Config {
            output_dir: output_dir.to_string_lossy().into_owned(),
        })
        .await
        .unwrap();
    store
}

pub fn state_with(store: Arc<dyn Store>, renderer: FakeRenderer) -> AppState {
    AppState::with_components(store, Arc::new(renderer), Arc::new(FakeDesktop::default()))
}

pub fn voucher_json(flight: &str, initials: &str, count: u32) -> String {
    json!({
        "flightNumber": flight,
        "date": "2024-01-01",
        "value": "£10",
        "reason": "Delay",
        "count": count,
        "issuer": { "initials": initials, "name": "Jane Doe" }
    })
    .to_string()
}
