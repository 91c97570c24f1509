use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::cleaner::{self, CleaningOptions, CleaningReport};
use crate::data::exporter::{self, ExportArtifact, ExportFormat};
use crate::data::loader;
use crate::data::model::Table;
use crate::data::projector;
use crate::data::visualizer::{self, ChartSpec, Histogram};
use crate::error::SweepError;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One file handed to the app: its name (which supplies the extension) and
/// raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            name: name.into(),
            bytes,
        }
    }

    /// Read a picked file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Upload::new(name, bytes))
    }

    pub fn size_kib(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    pub fn extension(&self) -> String {
        loader::extension_of(&self.name)
    }
}

/// The user's current choices for one file. Every control maps to a field;
/// nothing happens unless it is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions {
    pub remove_duplicates: bool,
    pub fill_missing: bool,
    /// Columns to keep, in order. `None` keeps every column as loaded.
    pub columns: Option<Vec<String>>,
    pub visualize: bool,
    pub convert_to: Option<ExportFormat>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Everything one pipeline run produced for a file.
#[derive(Debug, Clone)]
pub struct Processed {
    /// Columns of the loaded table, before projection.
    pub available_columns: Vec<String>,
    /// Malformed CSV records the loader dropped.
    pub skipped_rows: usize,
    /// First rows of the table as loaded, before cleaning or projection.
    pub preview: Table,
    /// The cleaned and projected table.
    pub table: Table,
    pub cleaning: CleaningReport,
    /// Whether the table has the two numeric columns a chart needs.
    pub chart_available: bool,
    pub chart: Option<ChartSpec>,
    pub histogram: Option<Histogram>,
    pub artifact: Option<ExportArtifact>,
}

/// Outcome for one file of a batch.
#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub size_kib: f64,
    pub outcome: Result<Processed, SweepError>,
}

// ---------------------------------------------------------------------------
// Running the stages
// ---------------------------------------------------------------------------

/// Run the whole pipeline for one file: load, clean, project, then chart and
/// export when asked. Each call starts again from the raw bytes.
pub fn process(
    upload: &Upload,
    actions: &Actions,
    settings: &Settings,
) -> Result<Processed, SweepError> {
    let size = upload.bytes.len() as u64;
    if size > settings.max_upload_bytes {
        return Err(SweepError::FileTooLarge {
            size,
            limit: settings.max_upload_bytes,
        });
    }

    let loaded = loader::load(&upload.bytes, &upload.extension())?;
    let available_columns = loaded.table.column_names();
    let preview = loaded.table.head(settings.preview_rows);

    let (cleaned, cleaning) = cleaner::clean(
        &loaded.table,
        CleaningOptions {
            remove_duplicates: actions.remove_duplicates,
            fill_missing: actions.fill_missing,
        },
    );

    let table = match &actions.columns {
        Some(columns) => projector::select(&cleaned, columns.as_slice())?,
        None => cleaned,
    };

    let chart_available = table.numeric_columns().nth(1).is_some();
    let (chart, histogram) = if actions.visualize {
        (
            visualizer::chart_spec(&table),
            visualizer::histogram(&table, settings.histogram_bins),
        )
    } else {
        (None, None)
    };

    let artifact = actions
        .convert_to
        .map(|format| exporter::export(&table, format, &upload.name, &settings.export_options()))
        .transpose()?;

    Ok(Processed {
        available_columns,
        skipped_rows: loaded.skipped_rows,
        preview,
        table,
        cleaning,
        chart_available,
        chart,
        histogram,
        artifact,
    })
}

/// Process files one after another. A failing file is logged and reported in
/// its own [`FileReport`]; the remaining files still run.
pub fn process_batch<F>(uploads: &[Upload], mut actions_for: F, settings: &Settings) -> Vec<FileReport>
where
    F: FnMut(&Upload) -> Actions,
{
    uploads
        .iter()
        .map(|upload| {
            let actions = actions_for(upload);
            let outcome = process(upload, &actions, settings);
            if let Err(e) = &outcome {
                log::error!("{}: {e}", upload.name);
            }
            FileReport {
                name: upload.name.clone(),
                size_kib: upload.size_kib(),
                outcome,
            }
        })
        .collect()
}
