use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::exporter::ExportOptions;

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV: &str = "DATA_SWEEPER_CONFIG";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default, so a settings file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown in each file's preview.
    pub preview_rows: usize,
    /// Bins of the single-column histogram.
    pub histogram_bins: usize,
    /// Worksheet name used for Excel exports.
    pub sheet_name: String,
    /// Uploads above this size are rejected.
    pub max_upload_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 10,
            sheet_name: "Sheet1".to_string(),
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Load from the file named by `DATA_SWEEPER_CONFIG`, falling back to the
    /// defaults when it is unset, missing or invalid.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::from_path(Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {e:#}");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing settings JSON")
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            sheet_name: self.sheet_name.clone(),
        }
    }
}
