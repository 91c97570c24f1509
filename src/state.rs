use crate::color::ColumnColors;
use crate::config::Settings;
use crate::data::exporter::{self, ExportArtifact, ExportFormat};
use crate::error::SweepError;
use crate::pipeline::{self, Actions, FileReport, Processed, Upload};

// ---------------------------------------------------------------------------
// Per-file state
// ---------------------------------------------------------------------------

/// One uploaded file: its bytes, the user's choices, and the outcome of the
/// last pipeline run over them.
pub struct FileSession {
    pub upload: Upload,
    pub actions: Actions,
    /// "Clean data" toggle; reveals the cleaning buttons.
    pub cleaning_open: bool,
    /// Selected entry of the "Convert to" radio.
    pub target: ExportFormat,
    pub result: Result<Processed, SweepError>,
    pub colors: ColumnColors,
    /// Short confirmation or error from the last save.
    pub notice: Option<String>,
}

impl FileSession {
    fn from_report(upload: Upload, report: FileReport) -> Self {
        log::debug!("{} ({:.2} KB) opened", report.name, report.size_kib);
        let colors = match &report.outcome {
            Ok(processed) => ColumnColors::new(&processed.available_columns),
            Err(_) => ColumnColors::default(),
        };
        FileSession {
            upload,
            actions: Actions::default(),
            cleaning_open: false,
            target: ExportFormat::default(),
            result: report.outcome,
            colors,
            notice: None,
        }
    }

    /// Re-run the whole pipeline with the current actions.
    pub fn rerun(&mut self, settings: &Settings) {
        self.result = pipeline::process(&self.upload, &self.actions, settings);
    }

    pub fn set_cleaning_open(&mut self, open: bool, settings: &Settings) {
        self.cleaning_open = open;
        if !open && (self.actions.remove_duplicates || self.actions.fill_missing) {
            self.actions.remove_duplicates = false;
            self.actions.fill_missing = false;
            self.rerun(settings);
        }
    }

    pub fn remove_duplicates(&mut self, settings: &Settings) {
        self.actions.remove_duplicates = true;
        self.rerun(settings);
    }

    pub fn fill_missing(&mut self, settings: &Settings) {
        self.actions.fill_missing = true;
        self.rerun(settings);
    }

    /// Columns currently kept, in table order.
    pub fn selected_columns(&self) -> Vec<String> {
        match (&self.actions.columns, &self.result) {
            (Some(columns), _) => columns.clone(),
            (None, Ok(processed)) => processed.available_columns.clone(),
            (None, Err(_)) => Vec::new(),
        }
    }

    /// Add or remove a column from the selection, keeping the loaded order.
    pub fn toggle_column(&mut self, column: &str, settings: &Settings) {
        let Ok(processed) = &self.result else {
            return;
        };
        let mut selected = self.selected_columns();
        if let Some(pos) = selected.iter().position(|c| c == column) {
            selected.remove(pos);
        } else {
            selected.push(column.to_string());
        }
        let ordered: Vec<String> = processed
            .available_columns
            .iter()
            .filter(|c| selected.contains(c))
            .cloned()
            .collect();

        self.actions.columns = if ordered.len() == processed.available_columns.len() {
            None
        } else {
            Some(ordered)
        };
        self.rerun(settings);
    }

    pub fn set_visualize(&mut self, visualize: bool, settings: &Settings) {
        self.actions.visualize = visualize;
        self.rerun(settings);
    }

    /// Export the current table to the selected target format. `Ok(None)`
    /// when the file has no table to export. A failed export leaves the
    /// pipeline result untouched.
    pub fn convert(&self, settings: &Settings) -> Result<Option<ExportArtifact>, SweepError> {
        let Ok(processed) = &self.result else {
            return Ok(None);
        };
        exporter::export(
            &processed.table,
            self.target,
            &self.upload.name,
            &settings.export_options(),
        )
        .map(Some)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Uploaded files, in the order they were picked.
    pub files: Vec<FileSession>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            files: Vec::new(),
            status_message: None,
        }
    }

    /// Replace the current files with a new batch and run each through the
    /// pipeline with no actions applied.
    pub fn open_uploads(&mut self, uploads: Vec<Upload>) {
        let reports = pipeline::process_batch(&uploads, |_| Actions::default(), &self.settings);
        let failed = reports.iter().filter(|r| r.outcome.is_err()).count();

        self.files = uploads
            .into_iter()
            .zip(reports)
            .map(|(upload, report)| FileSession::from_report(upload, report))
            .collect();

        self.status_message =
            (failed > 0).then(|| format!("{failed} of {} files could not be read", self.files.len()));
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.status_message = None;
    }
}
