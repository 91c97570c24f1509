use std::borrow::Cow;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

use super::model::{CellValue, Table};
use crate::error::SweepError;

/// Largest integer an `.xlsx` number cell (an IEEE double) holds exactly.
const MAX_EXACT_SPREADSHEET_INT: u64 = 1 << 53;

// ---------------------------------------------------------------------------
// Formats and artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Spreadsheet];

    /// Canonical file extension, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Spreadsheet => ".xlsx",
        }
    }

    /// IANA media type.
    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Name shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Name of the single worksheet written for spreadsheet exports.
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

/// A serialized table ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub file_name: String,
    pub media_type: &'static str,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Serialize `table` to `format`. The artifact's file name is `source_name`
/// with its extension swapped for the target one. Neither format gets a
/// row-index column.
pub fn export(
    table: &Table,
    format: ExportFormat,
    source_name: &str,
    options: &ExportOptions,
) -> Result<ExportArtifact, SweepError> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Spreadsheet => write_xlsx(table, &options.sheet_name)?,
    };

    let artifact = ExportArtifact {
        bytes,
        format,
        file_name: derive_file_name(source_name, format),
        media_type: format.media_type(),
    };
    log::info!(
        "Exported {} ({} bytes, {} rows x {} columns)",
        artifact.file_name,
        artifact.bytes.len(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(artifact)
}

/// `"sales.xlsx"` + CSV → `"sales.csv"`. A name without extension gets one
/// appended.
pub fn derive_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("export");
    format!("{stem}{}", format.extension())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// UTF-8, header row, missing values as empty fields.
fn write_csv(table: &Table) -> Result<Vec<u8>, SweepError> {
    if table.n_cols() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(table.columns().iter().map(|c| c.name.as_str()))
        .map_err(|e| SweepError::export("CSV", e))?;

    for row in table.rows() {
        let fields: Vec<Cow<'_, str>> = row.iter().map(|v| v.to_field()).collect();
        writer
            .write_record(fields.iter().map(|f| f.as_bytes()))
            .map_err(|e| SweepError::export("CSV", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| SweepError::export("CSV", e.into_error()))
}

// ---------------------------------------------------------------------------
// XLSX writer
// ---------------------------------------------------------------------------

fn xlsx_error(e: XlsxError) -> SweepError {
    SweepError::export("Excel", e)
}

/// One worksheet: header in the first row, then the data.
fn write_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>, SweepError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(xlsx_error)?;

    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| {
            SweepError::export("Excel", format!("too many columns ({})", table.n_cols()))
        })?;
        sheet
            .write_string(0, col, column.name.as_str())
            .map_err(xlsx_error)?;

        for (r, value) in column.values.iter().enumerate() {
            let row = u32::try_from(r + 1).map_err(|_| {
                SweepError::export("Excel", format!("too many rows ({})", table.n_rows()))
            })?;

            let written = match value {
                CellValue::Null => continue,
                CellValue::Integer(i) if i.unsigned_abs() <= MAX_EXACT_SPREADSHEET_INT => {
                    sheet.write_number(row, col, *i as f64)
                }
                CellValue::Integer(i) => sheet.write_string(row, col, i.to_string()),
                CellValue::Float(f) if !f.is_finite() => {
                    return Err(SweepError::export(
                        "Excel",
                        format!(
                            "column '{}' row {r}: {f} cannot be stored in a spreadsheet",
                            column.name
                        ),
                    ));
                }
                CellValue::Float(f) => sheet.write_number(row, col, *f),
                CellValue::Bool(b) => sheet.write_boolean(row, col, *b),
                CellValue::Text(s) | CellValue::Date(s) => sheet.write_string(row, col, s.as_str()),
            };
            written.map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;

    fn mixed() -> Table {
        Table::from_rows(
            vec!["name".into(), "age".into(), "score".into()],
            vec![
                vec![CellValue::Text("Alice".into()), CellValue::Integer(30), CellValue::Float(1.5)],
                vec![CellValue::Text("Bob, Jr.".into()), CellValue::Null, CellValue::Float(2.0)],
            ],
        )
    }

    #[test]
    fn csv_has_header_and_no_index() {
        let artifact = export(&mixed(), ExportFormat::Csv, "people.xlsx", &ExportOptions::default())
            .expect("csv export");
        let text = String::from_utf8(artifact.bytes).expect("utf-8");
        assert_eq!(text, "name,age,score\nAlice,30,1.5\n\"Bob, Jr.\",,2\n");
        assert_eq!(artifact.file_name, "people.csv");
        assert_eq!(artifact.media_type, "text/csv");
    }

    #[test]
    fn spreadsheet_header_matches_columns() {
        let artifact = export(
            &mixed(),
            ExportFormat::Spreadsheet,
            "people.csv",
            &ExportOptions::default(),
        )
        .expect("xlsx export");
        assert_eq!(artifact.file_name, "people.xlsx");
        assert_eq!(
            artifact.media_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let reloaded = loader::load(&artifact.bytes, ".xlsx").expect("readable workbook");
        assert_eq!(reloaded.table.column_names(), vec!["name", "age", "score"]);
        assert_eq!(
            reloaded.table.column("score").map(|c| c.values.clone()),
            Some(vec![CellValue::Float(1.5), CellValue::Float(2.0)])
        );
        assert_eq!(
            reloaded.table.column("age").map(|c| c.values[1].clone()),
            Some(CellValue::Null)
        );
    }

    #[test]
    fn spreadsheet_has_single_named_sheet() {
        use calamine::{Reader, Xlsx};

        let options = ExportOptions {
            sheet_name: "Cleaned".to_string(),
        };
        let artifact = export(&mixed(), ExportFormat::Spreadsheet, "p.csv", &options)
            .expect("xlsx export");
        let workbook: Xlsx<_> =
            Xlsx::new(std::io::Cursor::new(artifact.bytes)).expect("readable workbook");
        assert_eq!(workbook.sheet_names(), vec!["Cleaned".to_string()]);
    }

    #[test]
    fn non_finite_numbers_fail_spreadsheet_export() {
        let table = Table::from_rows(vec!["v".into()], vec![vec![CellValue::Float(f64::INFINITY)]]);
        assert!(matches!(
            export(&table, ExportFormat::Spreadsheet, "v.csv", &ExportOptions::default()),
            Err(SweepError::Export { .. })
        ));
    }

    #[test]
    fn invalid_sheet_name_fails_export() {
        let options = ExportOptions {
            sheet_name: "bad/name".to_string(),
        };
        assert!(matches!(
            export(&mixed(), ExportFormat::Spreadsheet, "p.csv", &options),
            Err(SweepError::Export { .. })
        ));
    }

    #[test]
    fn csv_round_trips_loaded_values() {
        let source = b"city,pop,share,flag\nOslo,700000,0.25,true\nLima,,1e-3,false\n";
        let loaded = loader::load(source, ".csv").expect("valid csv").table;
        let artifact =
            export(&loaded, ExportFormat::Csv, "c.csv", &ExportOptions::default()).expect("export");
        let reloaded = loader::load(&artifact.bytes, ".csv").expect("valid csv").table;
        assert_eq!(reloaded, loaded);
    }

    #[test]
    fn zero_column_table_exports_empty_csv() {
        let artifact = export(
            &Table::without_columns(2),
            ExportFormat::Csv,
            "e.csv",
            &ExportOptions::default(),
        )
        .expect("export");
        assert!(artifact.bytes.is_empty());
    }

    #[test]
    fn file_names_swap_extension() {
        assert_eq!(derive_file_name("report.final.CSV", ExportFormat::Spreadsheet), "report.final.xlsx");
        assert_eq!(derive_file_name("data", ExportFormat::Csv), "data.csv");
        assert_eq!(derive_file_name("", ExportFormat::Csv), "export.csv");
    }
}
