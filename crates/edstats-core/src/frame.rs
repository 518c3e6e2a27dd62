//! Long-format frame type and conversion from loaded CSV tables.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, NamedFrom, Series};
use tracing::debug;

use edstats_ingest::{CsvTable, any_to_f64, any_to_string};
use edstats_model::{
    CellValue, DataIssue, EdstatsError, IssueKind, PRIMARY_KEY, QualityReport, SentinelSet,
    SurveyYear, YEAR,
};

/// A long table: `PRIMARY_KEY`, the entity column, `YEAR`, then numeric
/// metric columns. One row per (entity, year).
#[derive(Debug, Clone)]
pub struct LongFrame {
    /// Name of the entity column (e.g. `STATE`, `DISTRICT`).
    pub entity_label: String,
    pub data: DataFrame,
}

impl LongFrame {
    pub fn new(entity_label: impl Into<String>, data: DataFrame) -> Self {
        Self {
            entity_label: entity_label.into(),
            data,
        }
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn key_columns(&self) -> [&str; 3] {
        [PRIMARY_KEY, self.entity_label.as_str(), YEAR]
    }

    /// Names of all non-key columns in frame order.
    pub fn metric_names(&self) -> Vec<String> {
        let keys = self.key_columns();
        self.data
            .get_column_names()
            .into_iter()
            .filter(|name| !keys.contains(&name.as_str()))
            .map(ToString::to_string)
            .collect()
    }

    pub fn primary_keys(&self) -> Result<Vec<String>> {
        self.text_values(PRIMARY_KEY)
    }

    pub fn entities(&self) -> Result<Vec<String>> {
        self.text_values(&self.entity_label)
    }

    pub fn years(&self) -> Result<Vec<Option<SurveyYear>>> {
        let column = self.data.column(YEAR).context("long frame has no YEAR column")?;
        Ok((0..self.data.height())
            .map(|idx| {
                let value = column.get(idx).unwrap_or(AnyValue::Null);
                any_to_f64(value)
                    .filter(|v| (0.0..=9999.0).contains(v))
                    .map(|v| SurveyYear::new(v as u16))
            })
            .collect())
    }

    /// Values of a metric column, or `None` when the column is absent.
    pub fn metric_values(&self, name: &str) -> Result<Option<Vec<Option<f64>>>> {
        let Ok(column) = self.data.column(name) else {
            return Ok(None);
        };
        let cast = column
            .cast(&DataType::Float64)
            .with_context(|| format!("cast {name} to Float64"))?;
        let values = cast.f64()?;
        Ok(Some(
            values
                .into_iter()
                .map(|value| value.filter(|v| !v.is_nan()))
                .collect(),
        ))
    }

    fn text_values(&self, name: &str) -> Result<Vec<String>> {
        let column = self
            .data
            .column(name)
            .with_context(|| format!("long frame has no {name} column"))?;
        Ok((0..self.data.height())
            .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect())
    }

    /// Assembles a frame from key vectors and named metric columns.
    pub fn from_parts(
        entity_label: &str,
        keys: Vec<String>,
        entities: Vec<String>,
        years: Vec<Option<i32>>,
        metrics: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let data = build_long_data(entity_label, keys, entities, years, metrics)?;
        Ok(Self::new(entity_label, data))
    }

    /// A frame with this frame's keys and the given metric columns, rows
    /// sorted by primary key. Metric vectors are in this frame's row order.
    pub fn derive(&self, metrics: Vec<(String, Vec<Option<f64>>)>) -> Result<Self> {
        let keys = self.primary_keys()?;
        let entities = self.entities()?;
        let years = self.years()?;
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|a, b| keys[*a].cmp(&keys[*b]));
        let metrics = metrics
            .into_iter()
            .map(|(name, values)| {
                let sorted = order
                    .iter()
                    .map(|row| values.get(*row).copied().flatten())
                    .collect();
                (name, sorted)
            })
            .collect();
        Self::from_parts(
            &self.entity_label,
            order.iter().map(|row| keys[*row].clone()).collect(),
            order.iter().map(|row| entities[*row].clone()).collect(),
            order
                .iter()
                .map(|row| years[*row].map(|y| i32::from(y.value())))
                .collect(),
            metrics,
        )
    }

    /// Rebuilds a long frame from a loaded CSV file.
    pub fn from_table(
        table: &CsvTable,
        entity_label: &str,
        sentinels: &SentinelSet,
    ) -> Result<(Self, QualityReport)> {
        for required in [PRIMARY_KEY, entity_label, YEAR] {
            if table.column_index(required).is_none() {
                return Err(EdstatsError::configuration(format!(
                    "long table is missing the `{required}` column"
                ))
                .into());
            }
        }
        let (data, report) = table_to_frame(table, &[PRIMARY_KEY, entity_label], sentinels)?;
        Ok((Self::new(entity_label, data), report))
    }
}

/// Builds key and metric columns in one pass.
pub(crate) fn build_long_data(
    entity_label: &str,
    keys: Vec<String>,
    entities: Vec<String>,
    years: Vec<Option<i32>>,
    metrics: Vec<(String, Vec<Option<f64>>)>,
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(metrics.len() + 3);
    columns.push(Series::new(PRIMARY_KEY.into(), keys).into());
    columns.push(Series::new(entity_label.into(), entities).into());
    columns.push(Series::new(YEAR.into(), years).into());
    for (name, values) in metrics {
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    DataFrame::new(columns).context("assemble long frame")
}

/// Columns holding at least one value that is neither a number nor a
/// sentinel.
pub fn infer_text_columns(table: &CsvTable, sentinels: &SentinelSet) -> Vec<String> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            (0..table.height())
                .any(|row| sentinels.coerce(table.cell(row, *idx)) == CellValue::Unparseable)
        })
        .map(|(_, name)| name.clone())
        .collect()
}

/// Converts a loaded table to a frame.
///
/// `text_columns` stay strings, `YEAR` becomes Int32, every other column is
/// parsed as Float64 with sentinels and unparseable text mapped to null.
pub fn table_to_frame(
    table: &CsvTable,
    text_columns: &[&str],
    sentinels: &SentinelSet,
) -> Result<(DataFrame, QualityReport)> {
    let mut report = QualityReport::new("load");
    let mut seen = BTreeSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len());
    for (idx, name) in table.headers.iter().enumerate() {
        if !seen.insert(name.as_str()) {
            debug!(column = %name, "skipping repeated header");
            continue;
        }
        let cells = (0..table.height()).map(|row| table.cell(row, idx));
        let column: Column = if text_columns.contains(&name.as_str()) {
            Series::new(name.as_str().into(), cells.collect::<Vec<_>>()).into()
        } else if name == YEAR {
            let years: Vec<Option<i32>> = cells.map(|cell| cell.trim().parse().ok()).collect();
            Series::new(name.as_str().into(), years).into()
        } else {
            let mut unparseable = 0u64;
            let values: Vec<Option<f64>> = cells
                .map(|cell| match sentinels.coerce(cell) {
                    CellValue::Number(value) => Some(value),
                    CellValue::Unparseable => {
                        unparseable += 1;
                        None
                    }
                    CellValue::Missing | CellValue::Sentinel => None,
                })
                .collect();
            if unparseable > 0 {
                report.push(DataIssue::new(
                    IssueKind::UnparseableValue,
                    Some(name.as_str()),
                    format!("{unparseable} non-numeric value(s) treated as missing"),
                    unparseable,
                ));
            }
            Series::new(name.as_str().into(), values).into()
        };
        columns.push(column);
    }
    let data = DataFrame::new(columns).context("assemble frame from csv")?;
    Ok((data, report))
}
