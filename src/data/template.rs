use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Headers the backend expects in an uploaded sales file, in template order.
pub const TEMPLATE_HEADERS: [&str; 10] = [
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

const EXAMPLE_ROWS: [[&str; 10]; 2] = [
    [
        "DrugD", "CurePharma", "2021", "446689.74", "10.98", "Retailer", "West", "142925.41",
        "397643.21", "Non-Compliant",
    ],
    [
        "DrugE", "CurePharma", "2020", "96738.44", "47.99", "Retailer", "Central", "163325.12",
        "50313.66", "Compliant",
    ],
];

/// Default file name offered by the save dialog.
pub const TEMPLATE_FILE_NAME: &str = "sales_data_template.csv";

/// Write the header row and two example rows as CSV.
pub fn write_template<W: Write>(out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(TEMPLATE_HEADERS)
        .context("writing template header")?;
    for record in EXAMPLE_ROWS {
        writer
            .write_record(record)
            .context("writing template row")?;
    }
    writer.flush().context("flushing template")?;
    Ok(())
}

/// Save the template to `path`.
pub fn save_template(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_template(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn template_has_headers_and_examples() {
        let mut buf = Vec::new();
        write_template(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TEMPLATE_HEADERS.join(","));
        assert!(lines[1].starts_with("DrugD,CurePharma,2021,"));
    }

    #[test]
    fn template_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TEMPLATE_FILE_NAME);
        save_template(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, TEMPLATE_HEADERS);
        assert_eq!(reader.records().count(), 2);
    }
}
