use std::borrow::Cow;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A tagged cell value mirroring the dtypes a CSV or spreadsheet cell can
/// load as. Rows are deduplicated through `HashSet<Vec<CellValue>>`, so
/// `CellValue` must be `Eq + Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// ISO-8601 date/time text from spreadsheet date cells.
    Date(String),
    /// Missing value.
    Null,
}

// -- Manual Eq/Ord/Hash: floats compare by total order with both zeros equal.

/// `-0.0` folds onto `0.0`; every other float keeps its bits.
fn canonical_float(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical_float(*a).total_cmp(&canonical_float(*b)),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => canonical_float(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Text written to a delimited file: missing values become an empty field.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => Cow::Borrowed(s),
            CellValue::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – a named sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// A column is numeric when it has rows and every non-missing cell is a
    /// number. An all-missing column therefore counts as numeric.
    pub fn is_numeric(&self) -> bool {
        !self.values.is_empty()
            && self
                .values
                .iter()
                .all(|v| v.is_null() || v.is_numeric())
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing numeric values, in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_f64)
    }

    /// Arithmetic mean of the non-missing numeric values.
    pub fn mean(&self) -> Option<f64> {
        let (sum, n) = self
            .numbers()
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }
}

// ---------------------------------------------------------------------------
// Table – ordered set of equal-length named columns
// ---------------------------------------------------------------------------

/// Column-major table. All columns have `n_rows` cells and column names are
/// unique; constructors maintain both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        debug_assert!(
            columns.iter().all(|c| c.values.len() == n_rows),
            "columns must have equal length"
        );
        debug_assert!(
            columns
                .iter()
                .enumerate()
                .all(|(i, c)| columns[..i].iter().all(|o| o.name != c.name)),
            "column names must be unique"
        );
        Table { columns, n_rows }
    }

    /// Build a table from row-major data. Short rows are padded with nulls and
    /// long rows truncated to the header width.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let n_rows = rows.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(n_rows)))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.values.push(cells.next().unwrap_or(CellValue::Null));
            }
        }

        Table { columns, n_rows }
    }

    /// A table with no columns but a known row count.
    pub fn without_columns(n_rows: usize) -> Self {
        Table {
            columns: Vec::new(),
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// Borrow the cells of row `idx` across all columns.
    pub fn row(&self, idx: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[idx]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Keep only the rows whose index is listed, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    indices.iter().map(|&i| c.values[i].clone()).collect(),
                )
            })
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }

    /// The first `n` rows, used for previews.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&indices)
    }
}
