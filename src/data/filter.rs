use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::columns::ColumnType;
use super::model::{CellValue, Dataset, Row, cell};

// ---------------------------------------------------------------------------
// Filter operators and values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Contains,
    Equals,
    GreaterOrEqual,
    LessOrEqual,
    Between,
}

impl FilterOp {
    /// Operators a column of the given type accepts.
    pub fn allowed_for(kind: ColumnType) -> &'static [FilterOp] {
        match kind {
            ColumnType::Text | ColumnType::Select => &[FilterOp::Contains, FilterOp::Equals],
            ColumnType::Number | ColumnType::Date => &[
                FilterOp::Equals,
                FilterOp::GreaterOrEqual,
                FilterOp::LessOrEqual,
                FilterOp::Between,
            ],
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterOp::Contains => "contains",
            FilterOp::Equals => "=",
            FilterOp::GreaterOrEqual => "≥",
            FilterOp::LessOrEqual => "≤",
            FilterOp::Between => "between",
        };
        f.write_str(s)
    }
}

/// What the user typed: one value, or a `[min, max]` pair for `Between`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    Range(String, String),
}

impl FilterValue {
    pub fn range(min: impl Into<String>, max: impl Into<String>) -> Self {
        FilterValue::Range(min.into(), max.into())
    }

    /// A scalar with nothing in it means "no filter".
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Scalar(s) => s.trim().is_empty(),
            FilterValue::Range(lo, hi) => lo.trim().is_empty() && hi.trim().is_empty(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Scalar(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("operator '{op}' cannot be used on a {} column", kind.label())]
    OperatorNotAllowed { op: FilterOp, kind: ColumnType },
    #[error("'{0}' needs a [min, max] range")]
    RangeRequired(FilterOp),
    #[error("'{0}' takes a single value, not a range")]
    ScalarRequired(FilterOp),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

// ---------------------------------------------------------------------------
// Compiled predicate
// ---------------------------------------------------------------------------

/// The per-row test, resolved once when the filter is built.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// Lowercased needle.
    Contains(String),
    TextEquals(String),
    NumberRange { min: Option<f64>, max: Option<f64> },
    NumberEquals(f64),
    /// ISO date strings, compared lexicographically.
    DateRange { min: Option<String>, max: Option<String> },
    DateEquals(String),
}

/// One column's active predicate, as built from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    op: FilterOp,
    value: FilterValue,
    predicate: Predicate,
}

impl FilterSpec {
    /// Validate `op` against the column type and compile the predicate.
    pub fn new(kind: ColumnType, op: FilterOp, value: FilterValue) -> Result<Self, FilterError> {
        if !FilterOp::allowed_for(kind).contains(&op) {
            return Err(FilterError::OperatorNotAllowed { op, kind });
        }

        let predicate = match (op, &value) {
            (FilterOp::Between, FilterValue::Scalar(_)) => {
                return Err(FilterError::RangeRequired(op));
            }
            (FilterOp::Between, FilterValue::Range(lo, hi)) => match kind {
                ColumnType::Number => Predicate::NumberRange {
                    min: parse_bound(lo)?,
                    max: parse_bound(hi)?,
                },
                _ => Predicate::DateRange {
                    min: text_bound(lo),
                    max: text_bound(hi),
                },
            },
            (_, FilterValue::Range(..)) => return Err(FilterError::ScalarRequired(op)),
            (FilterOp::Contains, FilterValue::Scalar(s)) => {
                Predicate::Contains(s.trim().to_lowercase())
            }
            (FilterOp::Equals, FilterValue::Scalar(s)) => match kind {
                ColumnType::Number => Predicate::NumberEquals(parse_number(s)?),
                ColumnType::Date => Predicate::DateEquals(s.trim().to_string()),
                _ => Predicate::TextEquals(s.trim().to_string()),
            },
            (FilterOp::GreaterOrEqual, FilterValue::Scalar(s)) => match kind {
                ColumnType::Number => Predicate::NumberRange {
                    min: Some(parse_number(s)?),
                    max: None,
                },
                _ => Predicate::DateRange {
                    min: Some(s.trim().to_string()),
                    max: None,
                },
            },
            (FilterOp::LessOrEqual, FilterValue::Scalar(s)) => match kind {
                ColumnType::Number => Predicate::NumberRange {
                    min: None,
                    max: Some(parse_number(s)?),
                },
                _ => Predicate::DateRange {
                    min: None,
                    max: Some(s.trim().to_string()),
                },
            },
        };

        Ok(FilterSpec {
            op,
            value,
            predicate,
        })
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Whether a cell passes. Null never passes, whatever the operator.
    ///
    /// A range whose min is above its max matches nothing.
    pub fn matches(&self, value: &CellValue) -> bool {
        if value.is_null() {
            return false;
        }
        match &self.predicate {
            Predicate::Contains(needle) => value.to_string().to_lowercase().contains(needle),
            Predicate::TextEquals(expected) => value.to_string() == *expected,
            Predicate::NumberEquals(expected) => value.as_f64() == Some(*expected),
            Predicate::NumberRange { min, max } => match value.as_f64() {
                Some(v) => min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m),
                None => false,
            },
            Predicate::DateEquals(expected) => value.to_string() == *expected,
            Predicate::DateRange { min, max } => {
                let v = value.to_string();
                min.as_deref().is_none_or(|m| v.as_str() >= m)
                    && max.as_deref().is_none_or(|m| v.as_str() <= m)
            }
        }
    }
}

fn parse_number(s: &str) -> Result<f64, FilterError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FilterError::NotANumber(s.to_string()))
}

/// An empty side of a range is open-ended.
fn parse_bound(s: &str) -> Result<Option<f64>, FilterError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_number(s).map(Some)
    }
}

fn text_bound(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

// ---------------------------------------------------------------------------
// Filter set
// ---------------------------------------------------------------------------

/// Active filters keyed by column name. A column with no entry is unfiltered.
pub type FilterSet = BTreeMap<String, FilterSpec>;

/// Whether a row passes every active filter.
pub fn row_matches(row: &Row, filters: &FilterSet) -> bool {
    filters
        .iter()
        .all(|(col, spec)| spec.matches(cell(row, col)))
}

/// Return indices of rows that pass all active filters, in source order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterSet) -> Vec<usize> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, filters))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::row;
    use pretty_assertions::assert_eq;

    fn sales() -> Dataset {
        Dataset::from_rows(vec![
            row(&[
                ("Product", "DrugA".into()),
                ("Date", "2021-03-01".into()),
                ("Price", 100.0.into()),
            ]),
            row(&[
                ("Product", "drugb".into()),
                ("Date", "2022-07-15".into()),
                ("Price", 250.0.into()),
            ]),
            row(&[
                ("Product", "Other".into()),
                ("Date", CellValue::Null),
                ("Price", CellValue::Null),
            ]),
            row(&[
                ("Product", CellValue::Null),
                ("Date", "2023-01-01".into()),
                ("Price", "400".into()),
            ]),
        ])
    }

    fn set(entries: Vec<(&str, FilterSpec)>) -> FilterSet {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn text_contains_is_case_insensitive() {
        let ds = sales();
        let spec = FilterSpec::new(ColumnType::Text, FilterOp::Contains, "DRUG".into()).unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Product", spec)])), [0, 1]);
    }

    #[test]
    fn text_equals_is_exact() {
        let ds = sales();
        let spec = FilterSpec::new(ColumnType::Select, FilterOp::Equals, "drugb".into()).unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Product", spec)])), [1]);
        let spec = FilterSpec::new(ColumnType::Select, FilterOp::Equals, "DrugB".into()).unwrap();
        assert!(filtered_indices(&ds, &set(vec![("Product", spec)])).is_empty());
    }

    #[test]
    fn number_between_is_inclusive_and_parses_text_cells() {
        let ds = sales();
        let spec = FilterSpec::new(
            ColumnType::Number,
            FilterOp::Between,
            FilterValue::range("100", "400"),
        )
        .unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Price", spec)])), [0, 1, 3]);

        let spec = FilterSpec::new(ColumnType::Number, FilterOp::GreaterOrEqual, "250".into()).unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Price", spec)])), [1, 3]);
    }

    #[test]
    fn date_between_compares_iso_strings() {
        let ds = sales();
        let spec = FilterSpec::new(
            ColumnType::Date,
            FilterOp::Between,
            FilterValue::range("2021-03-01", "2022-07-15"),
        )
        .unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Date", spec)])), [0, 1]);

        let spec = FilterSpec::new(ColumnType::Date, FilterOp::LessOrEqual, "2021-12-31".into()).unwrap();
        assert_eq!(filtered_indices(&ds, &set(vec![("Date", spec)])), [0]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = sales();
        let spec = FilterSpec::new(
            ColumnType::Number,
            FilterOp::Between,
            FilterValue::range("500", "100"),
        )
        .unwrap();
        assert!(filtered_indices(&ds, &set(vec![("Price", spec)])).is_empty());
    }

    #[test]
    fn null_fails_every_operator() {
        for (kind, op, value) in [
            (ColumnType::Text, FilterOp::Contains, FilterValue::from("")),
            (ColumnType::Number, FilterOp::Between, FilterValue::range("", "")),
            (ColumnType::Date, FilterOp::GreaterOrEqual, FilterValue::from("0000")),
        ] {
            let spec = FilterSpec::new(kind, op, value).unwrap();
            assert!(!spec.matches(&CellValue::Null));
        }
    }

    #[test]
    fn filters_combine_with_and() {
        let ds = sales();
        let filters = set(vec![
            (
                "Product",
                FilterSpec::new(ColumnType::Text, FilterOp::Contains, "drug".into()).unwrap(),
            ),
            (
                "Price",
                FilterSpec::new(ColumnType::Number, FilterOp::LessOrEqual, "200".into()).unwrap(),
            ),
        ]);
        assert_eq!(filtered_indices(&ds, &filters), [0]);
    }

    #[test]
    fn retained_rows_are_a_subset_satisfying_every_filter() {
        let ds = sales();
        let filters = set(vec![(
            "Date",
            FilterSpec::new(ColumnType::Date, FilterOp::GreaterOrEqual, "2022".into()).unwrap(),
        )]);
        let kept = filtered_indices(&ds, &filters);
        assert!(kept.iter().all(|&i| i < ds.len()));
        assert!(kept.iter().all(|&i| row_matches(&ds.rows()[i], &filters)));
        assert_eq!(kept, [1, 3]);
    }

    #[test]
    fn operator_must_fit_column_type() {
        let err = FilterSpec::new(ColumnType::Text, FilterOp::Between, FilterValue::range("a", "b"))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::OperatorNotAllowed {
                op: FilterOp::Between,
                kind: ColumnType::Text
            }
        );
        assert_eq!(
            FilterSpec::new(ColumnType::Number, FilterOp::Between, "5".into()).unwrap_err(),
            FilterError::RangeRequired(FilterOp::Between)
        );
        assert_eq!(
            FilterSpec::new(ColumnType::Number, FilterOp::Equals, "abc".into()).unwrap_err(),
            FilterError::NotANumber("abc".into())
        );
        assert_eq!(
            FilterSpec::new(ColumnType::Number, FilterOp::GreaterOrEqual, "inf".into()).unwrap_err(),
            FilterError::NotANumber("inf".into())
        );
    }
}
