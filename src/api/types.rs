//! Request and response bodies of the pricing backend.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::calendar::ISO_DATE;
use crate::data::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// A saved pricing formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// Absent inside the `GET /api/formulas` map, where it is the key.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub formula_string: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /api/formulas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFormula {
    pub name: String,
    pub description: String,
    pub formula_string: String,
}

/// Flatten the id → formula map, ordering ids numerically when they are
/// numbers (the backend hands out "1", "2", ... "10").
pub fn formulas_from_map(map: BTreeMap<String, Formula>) -> Vec<Formula> {
    let mut formulas: Vec<Formula> = map
        .into_iter()
        .map(|(id, mut f)| {
            f.id = id;
            f
        })
        .collect();
    formulas.sort_by(|a, b| {
        let key = |f: &Formula| f.id.parse::<u64>().ok();
        match (key(a), key(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        }
    });
    formulas
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

/// A variable a formula may reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: Option<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariablesResponse {
    pub variables: Vec<Variable>,
}

/// Variables offered when the backend does not list any.
pub fn default_variables() -> Vec<Variable> {
    vec![
        Variable {
            name: "Total Sales".into(),
            description: "Total sales in USD".into(),
            example: Some(CellValue::Number(446689.74)),
        },
        Variable {
            name: "Discount Percentage".into(),
            description: "Discount applied, in percent".into(),
            example: Some(CellValue::Number(10.98)),
        },
    ]
}

// ---------------------------------------------------------------------------
// Uploaded data
// ---------------------------------------------------------------------------

/// Checks the backend ran over the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSummary {
    pub missing_discounts: u64,
    pub govt_transactions: u64,
    pub duplicate_transactions: u64,
    pub total_columns: u64,
    pub available_columns: Vec<String>,
}

/// Body of `GET /api/data` and `POST /api/upload`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataResponse {
    pub data: Vec<Row>,
    pub validation_summary: ValidationSummary,
    pub message: Option<String>,
    pub rows: Option<u64>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CalculateRequest<'a> {
    pub formula_id: &'a str,
    pub data: &'a [Row],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalculationSummary {
    pub total_processed: u64,
    pub compliant_count: u64,
    pub non_compliant_count: u64,
    pub formula_used: String,
    pub formula_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationResponse {
    pub results: Vec<Row>,
    pub summary: CalculationSummary,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One entry of the calculation history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalculationRecord {
    pub timestamp: String,
    pub formula_id: String,
    pub rows_processed: u64,
    #[serde(default)]
    pub formula_name: Option<String>,
    #[serde(default)]
    pub compliant_count: Option<u64>,
    #[serde(default)]
    pub non_compliant_count: Option<u64>,
}

impl CalculationRecord {
    /// Calendar day of the timestamp, when it is ISO-8601.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, ISO_DATE).ok())
    }

    /// Timestamp without fractional seconds, `T` replaced by a space.
    pub fn display_time(&self) -> String {
        let trimmed = self.timestamp.split('.').next().unwrap_or(&self.timestamp);
        trimmed.replacen('T', " ", 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSummary {
    pub total_calculations: u64,
    pub latest_calculation: Option<CalculationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportsResponse {
    pub calculations: Vec<CalculationRecord>,
    pub summary: ReportSummary,
}

/// Optional date bounds for `GET /api/reports`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportQuery {
    /// `?start_date=..&end_date=..`, only for the bounds that are set.
    pub fn query_string(&self) -> String {
        let params: Vec<String> = [("start_date", self.start_date), ("end_date", self.end_date)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|d| format!("{k}={}", d.format(ISO_DATE))))
            .collect();
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}
