use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use crate::color::ColumnColors;
use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Table preview
// ---------------------------------------------------------------------------

/// Render the first rows of a table as a striped grid.
pub fn table_preview(ui: &mut Ui, file_idx: usize, table: &Table, colors: &ColumnColors) {
    if table.n_cols() == 0 {
        ui.label("No columns selected.");
        return;
    }

    ui.push_id(("preview", file_idx), |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(GridColumn::auto().at_least(60.0), table.n_cols())
                .header(20.0, |mut header| {
                    for column in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.label(
                                RichText::new(&column.name)
                                    .strong()
                                    .color(colors.color_for(&column.name)),
                            );
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.rows() {
                        body.row(18.0, |mut cells| {
                            for value in row {
                                cells.col(|ui: &mut Ui| {
                                    let text = RichText::new(value.to_string());
                                    ui.label(match value {
                                        CellValue::Null => text.weak().italics(),
                                        _ => text,
                                    });
                                });
                            }
                        });
                    }
                });
        });
    });
}
