//! Writes a deterministic synthetic sales file for trying the dashboard.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]` (defaults: `sample_sales.csv`, 200).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use clap::Parser;

#[derive(Parser)]
#[command(name = "generate_sample", about = "Write a synthetic sales CSV", long_about = None)]
struct Args {
    /// Output file
    #[arg(default_value = "sample_sales.csv")]
    output: PathBuf,

    /// Number of rows
    #[arg(default_value_t = 200)]
    rows: usize,
}

const HEADERS: [&str; 12] = [
    "Transaction Date",
    "Transaction Type",
    "Drug Name",
    "Manufacturer",
    "Sales Year",
    "Total Sales (USD)",
    "Discount Percentage (%)",
    "Customer Category",
    "Sales Region",
    "Regulatory Price Limit (USD)",
    "Effective Price After Discounts (USD)",
    "Pricing Compliance Status",
];

const DRUGS: [(&str, &str); 6] = [
    ("DrugA", "HealthCorp"),
    ("DrugB", "HealthCorp"),
    ("DrugC", "MediGen"),
    ("DrugD", "CurePharma"),
    ("DrugE", "CurePharma"),
    ("DrugF", "BioLife"),
];
const CUSTOMERS: [&str; 4] = ["Retailer", "Hospital", "Government", "Wholesaler"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const TRANSACTION_TYPES: [&str; 3] = ["Sale", "Rebate", "Return"];

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { output, rows } = Args::parse();

    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    writer.write_record(HEADERS).context("writing header")?;

    for _ in 0..rows {
        let date = first_day + Days::new(rng.next_u64() % 730);
        let (drug, manufacturer) = *rng.pick(&DRUGS);
        let total_sales = rng.range(20_000.0, 500_000.0);
        // About one row in ten has no discount recorded.
        let discount = (rng.next_f64() > 0.1).then(|| rng.range(0.0, 50.0));
        let effective = total_sales * (1.0 - discount.unwrap_or(0.0) / 100.0);
        let limit = total_sales * rng.range(0.5, 1.1);
        let status = if effective <= limit { "Compliant" } else { "Non-Compliant" };

        writer
            .write_record([
                date.format("%Y-%m-%d").to_string(),
                rng.pick(&TRANSACTION_TYPES).to_string(),
                drug.to_string(),
                manufacturer.to_string(),
                date.format("%Y").to_string(),
                money(total_sales),
                discount.map(money).unwrap_or_default(),
                rng.pick(&CUSTOMERS).to_string(),
                rng.pick(&REGIONS).to_string(),
                money(limit),
                money(effective),
                status.to_string(),
            ])
            .context("writing row")?;
    }
    writer.flush().context("flushing output")?;

    log::info!("wrote {rows} rows to {}", output.display());
    println!("Wrote {rows} sales rows to {}", output.display());
    Ok(())
}
