use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType as _, Reader, Xlsx};

use super::model::{CellValue, Table};
use crate::error::SweepError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// A freshly parsed table plus what the loader had to drop to get it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    /// CSV records skipped because they were malformed.
    pub skipped_rows: usize,
}

/// Parse raw file bytes into a [`Table`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by records; malformed records are skipped
/// * `.xlsx` – first worksheet, first row is the header
///
/// The extension is matched case-insensitively, with or without its dot.
pub fn load(bytes: &[u8], extension: &str) -> Result<LoadedTable, SweepError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    let (format, parse): (&str, fn(&[u8]) -> Result<LoadedTable, SweepError>) =
        match ext.as_str() {
            "csv" => ("CSV", load_csv),
            "xlsx" => ("Excel", load_xlsx),
            _ => return Err(SweepError::UnsupportedFormat(format!(".{ext}"))),
        };

    if bytes.is_empty() {
        return Err(SweepError::EmptyFile);
    }

    let loaded = parse(bytes)?;

    if loaded.table.is_empty() {
        return Err(SweepError::EmptyFile);
    }

    log::info!(
        "Loaded {format} table: {} rows x {} columns ({} malformed rows skipped)",
        loaded.table.n_rows(),
        loaded.table.n_cols(),
        loaded.skipped_rows
    );
    Ok(loaded)
}

/// Lowercase extension of an uploaded file name, including the dot
/// (`"Report.CSV"` → `".csv"`). Empty when the name has none.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Tokens read as a missing value, matching the defaults of common dataframe
/// readers.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSV layout: header row with column names, then one record per row.
/// Short records are padded with missing values. Records with more fields
/// than the header, or which are not valid UTF-8, are logged and skipped
/// rather than failing the whole file.
fn load_csv(bytes: &[u8]) -> Result<LoadedTable, SweepError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| SweepError::parse("CSV", e))?
        .clone();
    if headers.is_empty() {
        return Err(SweepError::EmptyFile);
    }

    let names = unique_column_names(
        headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string()),
    );
    let width = names.len();

    let mut rows = Vec::new();
    let mut skipped_rows = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping CSV row {row_no}: {e}");
                skipped_rows += 1;
                continue;
            }
        };

        if record.len() > width {
            log::warn!(
                "Skipping CSV row {row_no}: expected {width} fields, found {}",
                record.len()
            );
            skipped_rows += 1;
            continue;
        }

        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(LoadedTable {
        table: Table::from_rows(names, rows),
        skipped_rows,
    })
}

fn guess_cell_type(s: &str) -> CellValue {
    let t = s.trim();
    if MISSING_MARKERS.contains(&t) {
        return CellValue::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }
    match t {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook. Rows made only of empty
/// cells are dropped.
fn load_xlsx(bytes: &[u8]) -> Result<LoadedTable, SweepError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| SweepError::parse("Excel", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweepError::parse("Excel", "workbook contains no worksheets"))?
        .map_err(|e| SweepError::parse("Excel", e))?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Err(SweepError::EmptyFile);
    };
    let names = unique_column_names(header.iter().map(|cell| cell.to_string().trim().to_string()));

    let rows: Vec<Vec<CellValue>> = sheet_rows
        .map(|row| row.iter().map(excel_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_null))
        .collect();

    Ok(LoadedTable {
        table: Table::from_rows(names, rows),
        skipped_rows: 0,
    })
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Date(dt.to_string()))
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        other => CellValue::Text(other.to_string()),
    }
}

// -- Header helpers --

/// Make header names unique: blanks become `Unnamed: <idx>`, repeats get a
/// `.1`, `.2`, … suffix.
fn unique_column_names(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::exporter::{export, ExportFormat, ExportOptions};
    use rust_xlsxwriter::Workbook;

    fn texts(table: &Table, column: &str) -> Vec<CellValue> {
        table.column(column).map(|c| c.values.clone()).unwrap_or_default()
    }

    #[test]
    fn csv_cells_are_typed() {
        let loaded = load(b"name,age,score,ok\nAlice,30,1.5,true\nBob,,NaN,False\n", ".csv")
            .expect("valid csv");
        let t = loaded.table;
        assert_eq!(t.column_names(), vec!["name", "age", "score", "ok"]);
        assert_eq!(
            texts(&t, "age"),
            vec![CellValue::Integer(30), CellValue::Null]
        );
        assert_eq!(
            texts(&t, "score"),
            vec![CellValue::Float(1.5), CellValue::Null]
        );
        assert_eq!(
            texts(&t, "ok"),
            vec![CellValue::Bool(true), CellValue::Bool(false)]
        );
        assert_eq!(loaded.skipped_rows, 0);
    }

    #[test]
    fn overlong_csv_rows_are_skipped() {
        let loaded = load(b"a,b\n1,2\n3,4,5\n7,8\n", "csv").expect("recoverable csv");
        assert_eq!(loaded.table.n_rows(), 2);
        assert_eq!(loaded.skipped_rows, 1);
        assert_eq!(
            texts(&loaded.table, "a"),
            vec![CellValue::Integer(1), CellValue::Integer(7)]
        );
    }

    #[test]
    fn short_csv_rows_are_padded_with_missing() {
        let loaded =
            load(b"name,age,city\nAlice,30,Oslo\nBob,25\n", ".csv").expect("valid csv");
        assert_eq!(loaded.skipped_rows, 0);
        assert_eq!(loaded.table.n_rows(), 2);
        assert_eq!(
            texts(&loaded.table, "age"),
            vec![CellValue::Integer(30), CellValue::Integer(25)]
        );
        assert_eq!(
            texts(&loaded.table, "city"),
            vec![CellValue::Text("Oslo".into()), CellValue::Null]
        );
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut bytes = b"a,b\n1,2\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe,3\n");
        bytes.extend_from_slice(b"4,5\n");
        let loaded = load(&bytes, ".csv").expect("recoverable csv");
        assert_eq!(loaded.table.n_rows(), 2);
        assert_eq!(loaded.skipped_rows, 1);
    }

    #[test]
    fn zero_bytes_is_empty_file() {
        assert!(matches!(load(b"", ".csv"), Err(SweepError::EmptyFile)));
        assert!(matches!(load(b"", ".xlsx"), Err(SweepError::EmptyFile)));
    }

    #[test]
    fn header_only_is_empty_file() {
        assert!(matches!(load(b"a,b\n", ".csv"), Err(SweepError::EmptyFile)));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        match load(b"x", ".txt") {
            Err(SweepError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_workbook_is_parse_error() {
        assert!(matches!(
            load(b"definitely not a zip", ".xlsx"),
            Err(SweepError::Parse { .. })
        ));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let loaded = load(b"a,,a,a\n1,2,3,4\n", ".csv").expect("valid csv");
        assert_eq!(
            loaded.table.column_names(),
            vec!["a", "Unnamed: 1", "a.1", "a.2"]
        );
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        let loaded = load(b"name,n\n Alice , 7\n", ".csv").expect("valid csv");
        assert_eq!(
            texts(&loaded.table, "name"),
            vec![CellValue::Text(" Alice ".into())]
        );
        assert_eq!(texts(&loaded.table, "n"), vec![CellValue::Integer(7)]);
    }

    #[test]
    fn xlsx_first_sheet_is_read() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "city").expect("write");
        sheet.write_string(0, 1, "temp").expect("write");
        sheet.write_string(1, 0, "Oslo").expect("write");
        sheet.write_number(1, 1, 4.5).expect("write");
        sheet.write_string(3, 0, "Lima").expect("write");
        sheet.write_boolean(3, 1, true).expect("write");
        let bytes = workbook.save_to_buffer().expect("xlsx buffer");

        let loaded = load(&bytes, ".XLSX").expect("valid workbook");
        let t = loaded.table;
        assert_eq!(t.column_names(), vec!["city", "temp"]);
        // Row 2 is blank and dropped.
        assert_eq!(t.n_rows(), 2);
        assert_eq!(
            texts(&t, "temp"),
            vec![CellValue::Float(4.5), CellValue::Bool(true)]
        );
    }

    #[test]
    fn spreadsheet_round_trip_reads_integers_as_floats() {
        let table = Table::from_rows(
            vec!["id".into(), "name".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Text("a".into())],
                vec![CellValue::Integer(2), CellValue::Null],
            ],
        );
        let artifact = export(
            &table,
            ExportFormat::Spreadsheet,
            "t.xlsx",
            &ExportOptions::default(),
        )
        .expect("exportable");

        let reloaded = load(&artifact.bytes, ".xlsx").expect("readable workbook");
        assert_eq!(reloaded.table.column_names(), vec!["id", "name"]);
        assert_eq!(
            texts(&reloaded.table, "id"),
            vec![CellValue::Float(1.0), CellValue::Float(2.0)]
        );
        assert_eq!(
            texts(&reloaded.table, "name"),
            vec![CellValue::Text("a".into()), CellValue::Null]
        );
    }

    #[test]
    fn extension_of_lowercases_with_dot() {
        assert_eq!(extension_of("Report.CSV"), ".csv");
        assert_eq!(extension_of("book.v2.xlsx"), ".xlsx");
        assert_eq!(extension_of("README"), "");
    }
}
