use std::collections::BTreeSet;

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Column type inference
// ---------------------------------------------------------------------------

/// How a column is filtered and sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnType {
    Date,
    Number,
    Select,
    Text,
}

/// A column with fewer distinct non-null values than this is a `Select`.
pub const SELECT_THRESHOLD: usize = 10;

const DATE_HINTS: &[&str] = &["date", "year"];
const NUMBER_HINTS: &[&str] = &["price", "amount", "sales", "limit"];

/// Infer the type of a column from its name, then from its values.
///
/// Name hints win over cardinality: "Sales Year" is a date even though it
/// also contains "sales".
pub fn infer_column_type<'a, I>(name: &str, values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let lower = name.to_lowercase();
    if DATE_HINTS.iter().any(|h| lower.contains(h)) {
        return ColumnType::Date;
    }
    if NUMBER_HINTS.iter().any(|h| lower.contains(h)) {
        return ColumnType::Number;
    }

    let mut distinct = BTreeSet::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        distinct.insert(v.to_string());
        if distinct.len() >= SELECT_THRESHOLD {
            return ColumnType::Text;
        }
    }
    ColumnType::Select
}

impl ColumnType {
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Number => "number",
            ColumnType::Select => "select",
            ColumnType::Text => "text",
        }
    }
}

// ---------------------------------------------------------------------------
// Display formats
// ---------------------------------------------------------------------------

/// Display format of a column, resolved once per dataset from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// `$1,234.56`
    Currency,
    /// `12.5%`
    Percentage,
    Plain,
}

const CURRENCY_HINTS: &[&str] = &["price", "sales", "amount", "fees"];
const PERCENT_HINTS: &[&str] = &["percentage", "margin"];

impl ColumnFormat {
    pub fn for_column(name: &str) -> Self {
        let lower = name.to_lowercase();
        if CURRENCY_HINTS.iter().any(|h| lower.contains(h)) {
            ColumnFormat::Currency
        } else if PERCENT_HINTS.iter().any(|h| lower.contains(h)) {
            ColumnFormat::Percentage
        } else {
            ColumnFormat::Plain
        }
    }

    /// Render a cell. Only real numbers get currency formatting; numeric
    /// text gets the percent sign too.
    pub fn render(self, value: &CellValue) -> String {
        match (self, value) {
            (_, CellValue::Null) => value.to_string(),
            (ColumnFormat::Currency, CellValue::Number(v)) => {
                let grouped = group_fixed(*v, 2);
                match grouped.strip_prefix('-') {
                    Some(magnitude) => format!("-${magnitude}"),
                    None => format!("${grouped}"),
                }
            }
            (ColumnFormat::Percentage, v) if v.as_f64().is_some() => format!("{v}%"),
            (_, CellValue::Number(v)) => group_plain(*v),
            (_, v) => v.to_string(),
        }
    }
}

/// Format with exactly `decimals` fraction digits and thousands separators.
pub fn group_fixed(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let mut out = String::new();
    if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(decimals as i32)) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Thousands separators and at most three fraction digits, trailing zeros
/// dropped.
fn group_plain(value: f64) -> String {
    let grouped = group_fixed(value, 3);
    match grouped.split_once('.') {
        Some((int_part, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part}.{frac}")
            }
        }
        None => grouped,
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(n: usize) -> Vec<CellValue> {
        (0..n).map(|i| CellValue::Text(format!("v{i}"))).collect()
    }

    #[test]
    fn name_hints_decide_first() {
        assert_eq!(infer_column_type("Sales Year", &texts(50)), ColumnType::Date);
        assert_eq!(infer_column_type("Date", &[]), ColumnType::Date);
        assert_eq!(infer_column_type("Total Sales (USD)", &texts(3)), ColumnType::Number);
        assert_eq!(infer_column_type("Regulatory Limit", &[]), ColumnType::Number);
        assert_eq!(infer_column_type("PRICE", &[]), ColumnType::Number);
    }

    #[test]
    fn cardinality_decides_select_or_text() {
        assert_eq!(infer_column_type("Region", &texts(5)), ColumnType::Select);
        assert_eq!(infer_column_type("Customer", &texts(50)), ColumnType::Text);
        assert_eq!(infer_column_type("Customer", &texts(9)), ColumnType::Select);
        assert_eq!(infer_column_type("Customer", &texts(10)), ColumnType::Text);
    }

    #[test]
    fn cardinality_ignores_nulls_and_repeats() {
        let mut values = texts(9);
        values.extend(std::iter::repeat(CellValue::Null).take(20));
        values.extend(texts(9));
        assert_eq!(infer_column_type("Status", &values), ColumnType::Select);
    }

    #[test]
    fn currency_and_percentage_rendering() {
        let price = ColumnFormat::for_column("Calculated Price");
        assert_eq!(price, ColumnFormat::Currency);
        assert_eq!(price.render(&CellValue::Number(446689.744)), "$446,689.74");
        assert_eq!(price.render(&CellValue::Number(-1234.5)), "-$1,234.50");
        assert_eq!(price.render(&CellValue::Number(-0.001)), "$0.00");
        assert_eq!(price.render(&CellValue::from("n/a")), "n/a");

        let pct = ColumnFormat::for_column("Discount Percentage (%)");
        assert_eq!(pct, ColumnFormat::Percentage);
        assert_eq!(pct.render(&CellValue::from("10.98")), "10.98%");
        assert_eq!(pct.render(&CellValue::from("--")), "--");

        let plain = ColumnFormat::for_column("Quantity");
        assert_eq!(plain.render(&CellValue::Number(1234567.0)), "1,234,567");
        assert_eq!(plain.render(&CellValue::Number(0.125)), "0.125");
        assert_eq!(plain.render(&CellValue::Null), "--");
    }
}
