use std::collections::HashSet;

use super::model::{Column, Table};
use crate::error::SweepError;

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Keep only the named columns, in the order they are requested.
///
/// * Every name must exist in `table` → otherwise [`SweepError::UnknownColumn`]
/// * A name listed twice is kept once, at its first position
/// * An empty selection yields a zero-column table with the same row count
pub fn select<S: AsRef<str>>(table: &Table, column_names: &[S]) -> Result<Table, SweepError> {
    let mut picked: HashSet<&str> = HashSet::with_capacity(column_names.len());
    let mut columns: Vec<Column> = Vec::with_capacity(column_names.len());

    for name in column_names {
        let name = name.as_ref();
        let column = table
            .column(name)
            .ok_or_else(|| SweepError::UnknownColumn(name.to_string()))?;
        if picked.insert(name) {
            columns.push(column.clone());
        }
    }

    if columns.is_empty() {
        return Ok(Table::without_columns(table.n_rows()));
    }
    Ok(Table::from_columns(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Text("x".into()), CellValue::Float(0.5)],
                vec![CellValue::Integer(2), CellValue::Null, CellValue::Float(1.5)],
            ],
        )
    }

    #[test]
    fn keeps_requested_order() {
        let projected = select(&sample(), &["c", "a"]).expect("known columns");
        assert_eq!(projected.column_names(), vec!["c", "a"]);
        assert_eq!(projected.n_rows(), 2);
    }

    #[test]
    fn full_selection_reorders_without_changing_cells() {
        let table = sample();
        let projected = select(&table, &["b", "c", "a"]).expect("known columns");
        for name in ["a", "b", "c"] {
            assert_eq!(projected.column(name), table.column(name));
        }
        let identity = select(&table, table.column_names().as_slice()).expect("known columns");
        assert_eq!(identity, table);
    }

    #[test]
    fn empty_selection_is_zero_column_table() {
        let projected = select::<&str>(&sample(), &[]).expect("empty selection");
        assert_eq!(projected.n_cols(), 0);
        assert_eq!(projected.n_rows(), 2);
    }

    #[test]
    fn unknown_column_is_rejected() {
        match select(&sample(), &["a", "zzz"]) {
            Err(SweepError::UnknownColumn(name)) => assert_eq!(name, "zzz"),
            other => panic!("expected UnknownColumn, got {other:?}"),
        }
    }

    #[test]
    fn repeated_names_are_kept_once() {
        let projected = select(&sample(), &["a", "a", "b"]).expect("known columns");
        assert_eq!(projected.column_names(), vec!["a", "b"]);
    }
}
