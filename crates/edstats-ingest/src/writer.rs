use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use polars::prelude::{AnyValue, DataFrame};

use crate::csv_table::CsvTable;
use crate::polars_utils::any_to_string;

/// Renders a frame as CSV bytes: header row, `\n` terminators, numbers via
/// [`crate::format_numeric`], nulls as empty fields.
pub fn render_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let columns = df.get_columns();
    writer
        .write_record(columns.iter().map(|column| column.name().as_str()))
        .context("write csv header")?;
    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        writer.write_record(&record).context("write csv row")?;
    }
    writer.into_inner().context("flush csv buffer")
}

pub fn render_table(table: &CsvTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .context("write csv header")?;
    for row in &table.rows {
        writer.write_record(row).context("write csv row")?;
    }
    writer.into_inner().context("flush csv buffer")
}

/// Writes a frame to `path`, returning the bytes written.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<Vec<u8>> {
    let bytes = render_csv(df)?;
    write_bytes(&bytes, path)?;
    Ok(bytes)
}

pub fn write_table(table: &CsvTable, path: &Path) -> Result<Vec<u8>> {
    let bytes = render_table(table)?;
    write_bytes(&bytes, path)?;
    Ok(bytes)
}

fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write csv: {}", path.display()))
}
