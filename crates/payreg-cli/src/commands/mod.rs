//! Subcommands. Each pipeline step can be run on its own for manual testing.

pub mod analyze;
pub mod config;
pub mod ocr;
pub mod run;
pub mod submit;

use std::path::{Path, PathBuf};

use tracing::debug;

use payreg_core::PayregConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("payreg")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PayregConfig> {
    if let Some(path) = config_path {
        return Ok(PayregConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(PayregConfig::from_file(&default_path)?)
    } else {
        Ok(PayregConfig::default())
    }
}
