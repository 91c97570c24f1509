use serde_json::{json, Value as JsonValue};

use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// ChartSpec – two numeric columns plotted against each other
// ---------------------------------------------------------------------------

/// Bar chart of the first two numeric columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub x: String,
    pub y: String,
    /// Row-wise `(x, y)` pairs; rows missing either value are left out.
    pub points: Vec<(f64, f64)>,
}

/// Pick the first two numeric columns in table order.
///
/// Returns `None` when the table has fewer than two numeric columns; callers
/// show an advisory for that case, it is not an error.
pub fn chart_spec(table: &Table) -> Option<ChartSpec> {
    let mut numeric = table.numeric_columns();
    let x = numeric.next()?;
    let y = numeric.next()?;

    let points = x
        .values
        .iter()
        .zip(&y.values)
        .filter_map(|(xv, yv)| Some((xv.as_f64()?, yv.as_f64()?)))
        .collect();

    Some(ChartSpec {
        x: x.name.clone(),
        y: y.name.clone(),
        points,
    })
}

impl ChartSpec {
    /// Render as a Vega-Lite document: bar mark, quantitative axes titled by
    /// column name, tooltip on both fields, interactive scales.
    pub fn to_vega_lite(&self) -> JsonValue {
        let values: Vec<JsonValue> = self
            .points
            .iter()
            .map(|&(x, y)| {
                let mut row = serde_json::Map::new();
                row.insert(self.x.clone(), json!(x));
                row.insert(self.y.clone(), json!(y));
                JsonValue::Object(row)
            })
            .collect();

        json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "data": { "values": values },
            "mark": "bar",
            "encoding": {
                "x": { "field": self.x, "type": "quantitative", "title": self.x },
                "y": { "field": self.y, "type": "quantitative", "title": self.y },
                "tooltip": [
                    { "field": self.x, "type": "quantitative" },
                    { "field": self.y, "type": "quantitative" }
                ]
            },
            "params": [{ "name": "grid", "select": "interval", "bind": "scales" }]
        })
    }
}

// ---------------------------------------------------------------------------
// Histogram – distribution of the first numeric column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<Bin>,
}

/// Equal-width histogram of the first numeric column.
///
/// The bins cover `[min, max]`, the last one closed on the right. A column
/// whose values are all equal gets a one-unit span so the bins have width.
pub fn histogram(table: &Table, bin_count: usize) -> Option<Histogram> {
    if bin_count == 0 {
        return None;
    }
    let column = table.numeric_columns().next()?;
    let bins = bin_values(column, bin_count)?;
    Some(Histogram {
        column: column.name.clone(),
        bins,
    })
}

fn bin_values(column: &Column, bin_count: usize) -> Option<Vec<Bin>> {
    let values: Vec<f64> = column.numbers().filter(|v| v.is_finite()).collect();
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;

    let span = if max > min { max - min } else { 1.0 };
    let width = span / bin_count as f64;

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }
    Some(bins)
}
