use std::collections::HashSet;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Cleaning options and report
// ---------------------------------------------------------------------------

/// Which cleaning operations the user asked for. Nothing runs by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub fill_missing: bool,
}

/// A numeric column whose gaps were filled, and the mean used.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledColumn {
    pub name: String,
    pub mean: f64,
    pub cells_filled: usize,
}

/// What [`clean`] changed, for the confirmation messages in the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub duplicates_removed: usize,
    pub filled_columns: Vec<FilledColumn>,
}

impl CleaningReport {
    pub fn cells_filled(&self) -> usize {
        self.filled_columns.iter().map(|c| c.cells_filled).sum()
    }
}

/// Apply the requested operations: duplicates first, then imputation.
pub fn clean(table: &Table, options: CleaningOptions) -> (Table, CleaningReport) {
    let mut report = CleaningReport::default();
    let mut table = table.clone();

    if options.remove_duplicates {
        let (deduped, removed) = remove_duplicates(&table);
        table = deduped;
        report.duplicates_removed = removed;
    }
    if options.fill_missing {
        let (filled, columns) = fill_missing_numeric(&table);
        table = filled;
        report.filled_columns = columns;
    }

    log::debug!(
        "Cleaning done: {} duplicate rows removed, {} cells filled",
        report.duplicates_removed,
        report.cells_filled()
    );
    (table, report)
}

// ---------------------------------------------------------------------------
// Duplicate rows
// ---------------------------------------------------------------------------

/// Drop every row that equals an earlier row in all columns. The first
/// occurrence is kept and the order of kept rows is preserved. Returns the
/// new table and the number of rows removed.
pub fn remove_duplicates(table: &Table) -> (Table, usize) {
    let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(table.n_rows());
    let keep: Vec<usize> = table
        .rows()
        .enumerate()
        .filter_map(|(idx, row)| seen.insert(row).then_some(idx))
        .collect();

    let removed = table.n_rows() - keep.len();
    if removed == 0 {
        return (table.clone(), 0);
    }
    (table.take_rows(&keep), removed)
}

// ---------------------------------------------------------------------------
// Mean imputation
// ---------------------------------------------------------------------------

/// Replace missing cells of every numeric column with that column's mean.
/// Columns without any value to average, and non-numeric columns, are left
/// as they are.
pub fn fill_missing_numeric(table: &Table) -> (Table, Vec<FilledColumn>) {
    if table.n_cols() == 0 {
        return (table.clone(), Vec::new());
    }
    let mut filled = Vec::new();

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|col| {
            if !col.is_numeric() {
                return col.clone();
            }
            let missing = col.null_count();
            let Some(mean) = col.mean() else {
                return col.clone();
            };
            if missing == 0 {
                return col.clone();
            }

            filled.push(FilledColumn {
                name: col.name.clone(),
                mean,
                cells_filled: missing,
            });
            Column::new(
                col.name.clone(),
                col.values
                    .iter()
                    .map(|v| match v {
                        CellValue::Null => CellValue::Float(mean),
                        other => other.clone(),
                    })
                    .collect(),
            )
        })
        .collect();

    (Table::from_columns(columns), filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample() -> Table {
        Table::from_rows(
            vec!["name".into(), "age".into(), "city".into()],
            vec![
                vec![t("Alice"), CellValue::Integer(30), t("Oslo")],
                vec![t("Bob"), CellValue::Null, CellValue::Null],
                vec![t("Alice"), CellValue::Integer(30), t("Oslo")],
                vec![t("Cara"), CellValue::Integer(40), t("Lima")],
            ],
        )
    }

    #[test]
    fn duplicates_keep_first_occurrence_in_order() {
        let (deduped, removed) = remove_duplicates(&sample());
        assert_eq!(removed, 1);
        let names: Vec<String> = deduped.rows().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Cara"]);
    }

    #[test]
    fn remove_duplicates_is_idempotent() {
        let (once, _) = remove_duplicates(&sample());
        let (twice, removed) = remove_duplicates(&once);
        assert_eq!(once, twice);
        assert_eq!(removed, 0);
    }

    #[test]
    fn rows_differing_in_one_cell_are_kept() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(2)],
                vec![CellValue::Integer(1), CellValue::Integer(3)],
            ],
        );
        assert_eq!(remove_duplicates(&table).1, 0);
    }

    #[test]
    fn signed_zero_rows_are_duplicates() {
        let table = Table::from_rows(
            vec!["a".into()],
            vec![
                vec![CellValue::Float(0.0)],
                vec![CellValue::Float(-0.0)],
                vec![CellValue::Float(0.0)],
            ],
        );
        let (deduped, removed) = remove_duplicates(&table);
        assert_eq!(removed, 2);
        assert_eq!(deduped.n_rows(), 1);
    }

    #[test]
    fn fill_uses_column_mean() {
        let (filled, report) = fill_missing_numeric(&sample());
        let ages = &filled.column("age").expect("age column").values;
        // mean of 30, 30, 40
        let expected = 100.0 / 3.0;
        assert_eq!(ages[1], CellValue::Float(expected));
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].name, "age");
        assert_eq!(report[0].cells_filled, 1);
    }

    #[test]
    fn fill_leaves_text_columns_untouched() {
        let before = sample();
        let (after, _) = fill_missing_numeric(&before);
        assert_eq!(before.column("city"), after.column("city"));
        assert_eq!(before.column("name"), after.column("name"));
    }

    #[test]
    fn fill_leaves_complete_numeric_columns_untouched() {
        let table = Table::from_rows(
            vec!["x".into()],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2)]],
        );
        let (after, report) = fill_missing_numeric(&table);
        assert_eq!(after, table);
        assert!(report.is_empty());
    }

    #[test]
    fn fill_skips_all_missing_columns() {
        let table = Table::from_rows(
            vec!["x".into()],
            vec![vec![CellValue::Null], vec![CellValue::Null]],
        );
        let (after, report) = fill_missing_numeric(&table);
        assert_eq!(after, table);
        assert!(report.is_empty());
    }

    #[test]
    fn fill_is_idempotent() {
        let (once, _) = fill_missing_numeric(&sample());
        let (twice, report) = fill_missing_numeric(&once);
        assert_eq!(once, twice);
        assert!(report.is_empty());
    }

    #[test]
    fn clean_runs_only_requested_operations() {
        let (untouched, report) = clean(&sample(), CleaningOptions::default());
        assert_eq!(untouched, sample());
        assert_eq!(report, CleaningReport::default());

        let (both, report) = clean(
            &sample(),
            CleaningOptions {
                remove_duplicates: true,
                fill_missing: true,
            },
        );
        assert_eq!(both.n_rows(), 3);
        assert_eq!(report.duplicates_removed, 1);
        // mean after dedup: (30 + 40) / 2
        assert_eq!(
            both.column("age").expect("age column").values[1],
            CellValue::Float(35.0)
        );
        assert_eq!(report.cells_filled(), 1);
    }
}
