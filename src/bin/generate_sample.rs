//! Writes `sample_data.csv` and `sample_data.xlsx`: a small sales table with
//! duplicate rows and missing numbers, so every cleaning option has work to do.

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

#[derive(Clone)]
struct SaleRow {
    region: String,
    units: Option<i64>,
    revenue: Option<f64>,
}

const HEADER: [&str; 4] = ["order_id", "region", "units", "revenue"];

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Vec<(i64, SaleRow)> {
    let regions = ["North", "South", "East", "West"];
    let mut rows = Vec::with_capacity(n + n / 10);

    for id in 0..n as i64 {
        let units = rng.gauss(40.0, 12.0).round().max(1.0) as i64;
        let price = rng.gauss(19.5, 3.0).max(1.0);
        // Roughly one row in eight loses a number.
        let missing = rng.next_f64();
        rows.push((
            id,
            SaleRow {
                region: rng.pick(&regions).to_string(),
                units: (missing >= 0.06).then_some(units),
                revenue: (missing < 0.06 || missing >= 0.125)
                    .then(|| (units as f64 * price * 100.0).round() / 100.0),
            },
        ));
    }

    // Re-append every tenth row verbatim so deduplication has something to do.
    let duplicates: Vec<(i64, SaleRow)> = rows.iter().step_by(10).cloned().collect();
    rows.extend(duplicates);
    rows
}

fn write_csv(path: &str, rows: &[(i64, SaleRow)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for (id, row) in rows {
        writer.write_record([
            id.to_string(),
            row.region.clone(),
            row.units.map(|u| u.to_string()).unwrap_or_default(),
            row.revenue.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush().with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_xlsx(path: &str, rows: &[(i64, SaleRow)]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;
    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, (id, row)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, *id as f64)?;
        sheet.write_string(r, 1, row.region.as_str())?;
        if let Some(units) = row.units {
            sheet.write_number(r, 2, units as f64)?;
        }
        if let Some(revenue) = row.revenue {
            sheet.write_number(r, 3, revenue)?;
        }
    }
    workbook.save(path).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 200);

    write_csv("sample_data.csv", &rows)?;
    write_xlsx("sample_data.xlsx", &rows)?;

    println!(
        "Wrote {} rows ({} duplicates) to sample_data.csv and sample_data.xlsx",
        rows.len(),
        rows.len() - 200
    );
    Ok(())
}
