use std::cmp::Ordering;

use super::columns::ColumnType;
use super::model::{CellValue, Dataset, cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "⏶",
            SortDirection::Descending => "⏷",
        }
    }
}

/// The single active sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    #[cfg(test)]
    pub fn descending(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Pre-computed comparison key so each cell is converted once, not once per
/// comparison.
enum SortKey {
    Number(f64),
    /// Lowercased text first, then raw text with lowercase ahead of
    /// uppercase (`"a"` before `"A"`).
    Text(String, String),
    Null,
}

impl SortKey {
    fn new(value: &CellValue, kind: ColumnType) -> Self {
        match value {
            CellValue::Null => SortKey::Null,
            v => match (kind, v.as_f64()) {
                (ColumnType::Number, Some(n)) => SortKey::Number(n),
                _ => {
                    let raw = v.to_string();
                    SortKey::Text(raw.to_lowercase(), raw)
                }
            },
        }
    }
}

/// Compare two keys. Nulls go last regardless of `direction`; only the
/// ordering between non-null values is reversed.
fn compare(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    let ord = match (a, b) {
        (SortKey::Null, SortKey::Null) => return Ordering::Equal,
        (SortKey::Null, _) => return Ordering::Greater,
        (_, SortKey::Null) => return Ordering::Less,
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        // Numbers ahead of unparseable text within a number column.
        (SortKey::Number(_), SortKey::Text(..)) => Ordering::Less,
        (SortKey::Text(..), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(xl, xr), SortKey::Text(yl, yr)) => xl.cmp(yl).then_with(|| yr.cmp(xr)),
    };
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Return `indices` reordered by `sort`. Stable: equal keys keep their
/// input order.
pub fn sorted_indices(dataset: &Dataset, indices: &[usize], sort: &SortSpec) -> Vec<usize> {
    let kind = dataset.column_type(&sort.column);
    let mut keyed: Vec<(usize, SortKey)> = indices
        .iter()
        .filter_map(|&i| {
            let row = dataset.row(i)?;
            Some((i, SortKey::new(cell(row, &sort.column), kind)))
        })
        .collect();
    keyed.sort_by(|(_, a), (_, b)| compare(a, b, sort.direction));
    keyed.into_iter().map(|(i, _)| i).collect()
}
