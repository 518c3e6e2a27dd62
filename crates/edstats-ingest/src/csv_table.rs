use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

/// A CSV file held as trimmed strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Cell text, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Framing of published tables that carry banner text above the header and
/// notes below the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Lines dropped before the header row.
    pub skip_rows: usize,
    /// Lines dropped from the end of the file.
    pub skip_footer: usize,
}

impl ReadOptions {
    /// Layout of the NCES table generator exports.
    pub fn nces_export() -> Self {
        Self {
            skip_rows: 6,
            skip_footer: 7,
        }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    read_csv_table_with_options(path, ReadOptions::default())
}

pub fn read_csv_table_with_options(path: &Path, options: ReadOptions) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        records.push(record.iter().map(normalize_cell).collect());
    }
    let end = records.len().saturating_sub(options.skip_footer);
    let mut framed = records
        .into_iter()
        .take(end)
        .skip(options.skip_rows)
        .filter(|row| row.iter().any(|value| !value.is_empty()));
    let Some(header_row) = framed.next() else {
        return Ok(CsvTable::default());
    };
    let headers: Vec<String> = header_row.iter().map(|value| normalize_header(value)).collect();
    let width = headers.len();
    let rows: Vec<Vec<String>> = framed
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    debug!(
        path = %path.display(),
        columns = width,
        rows = rows.len(),
        "loaded csv table"
    );
    Ok(CsvTable { headers, rows })
}
