use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::table::{parse_number, CellValue, Table};

/// Delimiter implied by the file extension: tab for `.tsv`, comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Load a delimited file as a table named after the file stem. The first
/// record is kept as the header row.
pub fn load_csv_table(path: &Path, delimiter: u8) -> Result<Table> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let table = read_table(name, file, delimiter)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!(
        "Loaded table {} with {} rows from {}",
        table.name,
        table.rows.len(),
        path.display()
    );
    Ok(table)
}

pub fn read_table<R: Read>(name: impl Into<String>, reader: R, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        values.push(record.iter().map(parse_field).collect());
    }
    Ok(Table::from_values(name, values))
}

/// Render a table back to delimited text, absent cells as empty fields.
pub fn write_table(table: &Table, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.text()))?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    Ok(String::from_utf8(bytes)?)
}

fn parse_field(field: &str) -> Option<CellValue> {
    if field.trim().is_empty() {
        None
    } else if let Some(n) = parse_number(field) {
        Some(CellValue::Number(n))
    } else {
        Some(CellValue::Text(field.to_string()))
    }
}
