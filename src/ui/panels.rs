use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::Settings;
use crate::data::exporter::{ExportArtifact, ExportFormat};
use crate::pipeline::Upload;
use crate::state::{AppState, FileSession};
use crate::ui::{plot, preview};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.files.is_empty() {
            ui.label(format!("{} files loaded", state.files.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – one section per file
// ---------------------------------------------------------------------------

pub fn files_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("💿 Data Sweeper");
    ui.label(
        "Transform your files between CSV and Excel formats with built-in data cleaning and visualization!",
    );
    ui.separator();

    if state.files.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open CSV or Excel files to begin  (File → Open…)");
        });
        return;
    }

    let settings = state.settings.clone();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, file) in state.files.iter_mut().enumerate() {
                egui::CollapsingHeader::new(RichText::new(&file.upload.name).strong())
                    .id_salt(("file", idx))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        file_section(ui, idx, file, &settings);
                    });
                ui.separator();
            }

            ui.label(RichText::new("🎉 All files processed!").color(Color32::GREEN));
        });
}

fn file_section(ui: &mut Ui, idx: usize, file: &mut FileSession, settings: &Settings) {
    ui.label(format!("File Name: {}", file.upload.name));
    ui.label(format!("File Size: {:.2} KB", file.upload.size_kib()));

    let processed = match &file.result {
        Ok(processed) => processed,
        Err(e) => {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
            return;
        }
    };

    if processed.skipped_rows > 0 {
        ui.label(
            RichText::new(format!("{} malformed rows were skipped", processed.skipped_rows))
                .color(Color32::YELLOW),
        );
    }

    // ---- Preview ----
    ui.strong("🔍 Preview");
    preview::table_preview(ui, idx, &processed.preview, &file.colors);
    ui.label(format!(
        "Current result: {} rows × {} columns",
        processed.table.n_rows(),
        processed.table.n_cols()
    ));

    // Interactions are collected first and applied after rendering, since
    // each one re-runs the pipeline and replaces `file.result`.
    let mut cleaning_open = file.cleaning_open;
    let mut dedup_clicked = false;
    let mut fill_clicked = false;
    let mut toggled_column: Option<String> = None;
    let mut visualize = file.actions.visualize;
    let mut convert_clicked = false;

    // ---- Cleaning ----
    ui.add_space(6.0);
    ui.strong("🛠 Data Cleaning Options");
    ui.checkbox(&mut cleaning_open, format!("Clean data for {}", file.upload.name));
    if file.cleaning_open {
        ui.horizontal(|ui: &mut Ui| {
            dedup_clicked = ui.button("Remove duplicates").clicked();
            fill_clicked = ui.button("Fill missing values").clicked();
        });
        if file.actions.remove_duplicates {
            ui.label(format!(
                "✅ Duplicates removed! ({} rows)",
                processed.cleaning.duplicates_removed
            ));
        }
        if file.actions.fill_missing {
            ui.label(format!(
                "✅ Missing values filled! ({} cells)",
                processed.cleaning.cells_filled()
            ));
            for filled in &processed.cleaning.filled_columns {
                ui.small(format!("{}: mean {:.4}", filled.name, filled.mean));
            }
        }
    }

    // ---- Column selection ----
    ui.add_space(6.0);
    ui.strong("🎯 Select Columns to Convert");
    let selected = file.selected_columns();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for column in &processed.available_columns {
            let mut checked = selected.contains(column);
            if ui.checkbox(&mut checked, column.as_str()).changed() {
                toggled_column = Some(column.clone());
            }
        }
    });

    // ---- Visualization ----
    ui.add_space(6.0);
    ui.strong("📊 Data Visualization");
    if processed.chart_available {
        ui.checkbox(&mut visualize, format!("Show visualization for {}", file.upload.name));
        if let Some(chart) = &processed.chart {
            plot::chart_plot(ui, idx, chart, &file.colors);
            if ui.small_button("Copy Vega-Lite spec").clicked() {
                ui.ctx().copy_text(chart.to_vega_lite().to_string());
            }
        }
        if let Some(histogram) = &processed.histogram {
            ui.small(format!("Distribution of {}", histogram.column));
            plot::histogram_plot(ui, idx, histogram, &file.colors);
        }
    } else {
        ui.label(
            RichText::new("Not enough numeric columns for visualization.").color(Color32::YELLOW),
        );
    }

    // ---- Conversion ----
    ui.add_space(6.0);
    ui.strong("🔄 Conversion Options");
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Convert {} to:", file.upload.name));
        for format in ExportFormat::ALL {
            ui.radio_value(&mut file.target, format, format.label());
        }
    });
    if ui.button(format!("Convert {}", file.upload.name)).clicked() {
        convert_clicked = true;
    }
    if let Some(notice) = &file.notice {
        ui.label(notice.as_str());
    }

    // ---- Apply interactions ----
    if cleaning_open != file.cleaning_open {
        file.set_cleaning_open(cleaning_open, settings);
    }
    if dedup_clicked {
        file.remove_duplicates(settings);
    }
    if fill_clicked {
        file.fill_missing(settings);
    }
    if let Some(column) = toggled_column {
        file.toggle_column(&column, settings);
    }
    if visualize != file.actions.visualize {
        file.set_visualize(visualize, settings);
    }
    if convert_clicked {
        file.notice = Some(match convert_and_save(file, settings) {
            Ok(Some(path)) => format!("⬇ Saved {path}"),
            Ok(None) => "Save cancelled".to_string(),
            Err(e) => {
                log::error!("Conversion of {} failed: {e:#}", file.upload.name);
                format!("Error: {e:#}")
            }
        });
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let Some(paths) = rfd::FileDialog::new()
        .set_title("Upload your files (CSV or Excel)")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files()
    else {
        return;
    };

    let mut uploads = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in &paths {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                log::error!("Failed to read file: {e:#}");
                unreadable.push(format!("{e:#}"));
            }
        }
    }

    log::info!("Opening {} files", uploads.len());
    state.open_uploads(uploads);
    if !unreadable.is_empty() {
        state.status_message = Some(format!("Error: {}", unreadable.join("; ")));
    }
}

/// Export the file's current table and hand the bytes to a save dialog.
/// Returns the saved path, or `None` when the user cancelled.
fn convert_and_save(file: &FileSession, settings: &Settings) -> Result<Option<String>> {
    let Some(artifact) = file.convert(settings)? else {
        return Ok(None);
    };
    save_artifact(&artifact)
}

fn save_artifact(artifact: &ExportArtifact) -> Result<Option<String>> {
    let extension = artifact.format.extension().trim_start_matches('.');
    let Some(path) = rfd::FileDialog::new()
        .set_title(format!("Download as {}", artifact.format.label()))
        .set_file_name(artifact.file_name.as_str())
        .add_filter(artifact.format.label(), &[extension])
        .save_file()
    else {
        return Ok(None);
    };

    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Saved {} ({}) to {}",
        artifact.file_name,
        artifact.media_type,
        path.display()
    );
    Ok(Some(path.display().to_string()))
}
