//! User-facing application configuration (where vouchers are written).

pub mod handlers;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::store::Store;

const DEFAULT_OUTPUT_DIR: &str = "vouchers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[schema(example = "/home/agent/vouchers")]
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            output_dir: cwd.join(DEFAULT_OUTPUT_DIR).to_string_lossy().into_owned(),
        }
    }
}

impl Config {
    pub fn output_root(&self) -> &Path {
        Path::new(&self.output_dir)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.output_dir.trim().is_empty() {
            return Err(AppError::MalformedRequest(
                "outputDir must be a non-empty path".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read the stored config, falling back to the default when it is missing or
/// the store cannot be read.
pub async fn resolve(store: &dyn Store) -> Config {
    match store.get_config().await {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            log::error!("Unable to read config, reverting to default config: {}", e);
            Config::default()
        }
    }
}
