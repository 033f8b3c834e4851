use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::columns::{ColumnFormat, ColumnType, infer_column_type};

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what the backend sends: a string, a
/// number or nothing at all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

/// Placeholder rendered for null or absent cells.
pub const NULL_PLACEHOLDER: &str = "--";

impl From<JsonValue> for CellValue {
    fn from(val: JsonValue) -> Self {
        match val {
            JsonValue::String(s) => CellValue::Text(s),
            JsonValue::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "{NULL_PLACEHOLDER}"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Interpret the value as a number. Text that parses as a finite float
    /// counts; `"NaN"` and `"inf"` stay text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one uploaded record
// ---------------------------------------------------------------------------

/// Column name → value, in the order the backend sent them.
pub type Row = IndexMap<String, CellValue>;

static NULL_CELL: CellValue = CellValue::Null;

/// Look up a cell, treating a missing column as null.
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a CellValue {
    row.get(column).unwrap_or(&NULL_CELL)
}

// ---------------------------------------------------------------------------
// Dataset – rows plus per-column metadata computed once
// ---------------------------------------------------------------------------

/// Column metadata derived from all rows of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnType,
    pub format: ColumnFormat,
}

/// The full row set with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Row>,
    /// Columns in first-seen order across rows.
    columns: Vec<ColumnInfo>,
    /// For each column the sorted set of distinct non-null rendered values.
    distinct: BTreeMap<String, BTreeSet<String>>,
}

impl Dataset {
    /// Build column metadata from the loaded rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut distinct: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in row {
                if !distinct.contains_key(col) {
                    order.push(col.clone());
                    distinct.insert(col.clone(), BTreeSet::new());
                }
                if !val.is_null() {
                    if let Some(set) = distinct.get_mut(col) {
                        set.insert(val.to_string());
                    }
                }
            }
        }

        let columns = order
            .into_iter()
            .map(|name| {
                let kind = infer_column_type(&name, rows.iter().map(|r| cell(r, &name)));
                let format = ColumnFormat::for_column(&name);
                ColumnInfo { name, kind, format }
            })
            .collect();

        Dataset {
            rows,
            columns,
            distinct,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column type, defaulting to text for unknown columns.
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.column(name).map_or(ColumnType::Text, |c| c.kind)
    }

    /// Sorted distinct non-null values of a column, as rendered strings.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        self.distinct
            .get(column)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Columns that carry a value in the first row; the rest start hidden.
    pub fn populated_in_first_row(&self) -> Vec<String> {
        match self.rows.first() {
            Some(first) => first
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Render one cell with its column's display format.
    pub fn format_cell(&self, row: &Row, column: &str) -> String {
        let value = cell(row, column);
        match self.column(column) {
            Some(info) => info.format.render(value),
            None => value.to_string(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn row(cells: &[(&str, CellValue)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
