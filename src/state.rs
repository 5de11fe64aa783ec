use std::sync::Arc;

use crate::jobs::{GenerationWorker, JobRegistry, ProgressChannel};
use crate::platform::{Desktop, SystemDesktop};
use crate::render::{TypstVoucherRenderer, VoucherRenderer};
use crate::settings::Settings;
use crate::store::{JsonFileStore, Store};
use crate::voucher::VoucherService;

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jobs: Arc<JobRegistry>,
    pub progress: Arc<ProgressChannel>,
    pub vouchers: VoucherService,
    pub desktop: Arc<dyn Desktop>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let store = JsonFileStore::open(settings.store_path.clone())?;
        log::info!("Using store at {}", store.path().display());
        let renderer = TypstVoucherRenderer::new(settings.typst_bin.clone())?;

        Ok(Self::with_components(
            Arc::new(store),
            Arc::new(renderer),
            Arc::new(SystemDesktop::new()),
        ))
    }

    pub fn with_components(
        store: Arc<dyn Store>,
        renderer: Arc<dyn VoucherRenderer>,
        desktop: Arc<dyn Desktop>,
    ) -> Self {
        let jobs = Arc::new(JobRegistry::new());
        let progress = Arc::new(ProgressChannel::new());
        let worker = GenerationWorker::new(jobs.clone(), progress.clone(), store.clone(), renderer);
        let vouchers = VoucherService::new(store.clone(), jobs.clone(), worker);

        Self {
            store,
            jobs,
            progress,
            vouchers,
            desktop,
        }
    }
}
