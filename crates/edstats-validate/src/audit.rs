//! Null and sanity audit of a finished table.

use std::collections::{BTreeMap, HashMap};

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use serde::Serialize;
use tracing::{debug, info, info_span};

use edstats_ingest::{any_to_f64, any_to_string};
use edstats_model::{AuditOptions, DataIssue, EdstatsError, IssueKind, QualityReport};

use crate::stats::ColumnStats;

/// Null count of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: u64,
}

/// Null counts of the rows sharing one year label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearNulls {
    /// Rendered year label; the empty string groups rows without one.
    pub year: String,
    pub rows: u64,
    pub nulls: Vec<NullCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub rows: usize,
    /// Statistics of numeric columns, in table order.
    pub statistics: Vec<ColumnStats>,
    /// Null counts of every column, in table order.
    pub null_counts: Vec<NullCount>,
    /// Present when a year label was requested, sorted by year.
    pub nulls_by_year: Option<Vec<YearNulls>>,
    pub issues: QualityReport,
}

impl AuditReport {
    pub fn total_nulls(&self) -> u64 {
        self.null_counts.iter().map(|count| count.nulls).sum()
    }

    pub fn column_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.statistics.iter().find(|stats| stats.column == column)
    }

    pub fn nulls(&self, column: &str) -> Option<u64> {
        self.null_counts
            .iter()
            .find(|count| count.column == column)
            .map(|count| count.nulls)
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_null(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn null_mask(column: &Column) -> Vec<bool> {
    (0..column.len())
        .map(|idx| is_null(&column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

fn numeric_values(column: &Column) -> Vec<f64> {
    (0..column.len())
        .filter_map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

fn labels(column: &Column) -> Vec<String> {
    (0..column.len())
        .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

fn group_by_year(
    data: &DataFrame,
    year_label: &str,
    masks: &[(String, Vec<bool>)],
) -> Result<Vec<YearNulls>, EdstatsError> {
    let year_column = data.column(year_label).map_err(|_| {
        EdstatsError::configuration(format!(
            "year label column {year_label} is not in the audited table"
        ))
    })?;
    let years = labels(year_column);
    let mut groups: BTreeMap<&str, (u64, Vec<u64>)> = BTreeMap::new();
    for (row, year) in years.iter().enumerate() {
        let entry = groups
            .entry(year.as_str())
            .or_insert_with(|| (0, vec![0; masks.len()]));
        entry.0 += 1;
        for (slot, (_, mask)) in masks.iter().enumerate() {
            if mask[row] {
                entry.1[slot] += 1;
            }
        }
    }
    Ok(groups
        .into_iter()
        .map(|(year, (rows, counts))| YearNulls {
            year: year.to_string(),
            rows,
            nulls: masks
                .iter()
                .zip(counts)
                .filter(|((name, _), _)| name != year_label)
                .map(|((name, _), nulls)| NullCount {
                    column: name.clone(),
                    nulls,
                })
                .collect(),
        })
        .collect())
}

fn check_unique(data: &DataFrame, key_column: &str, report: &mut QualityReport) {
    let Ok(column) = data.column(key_column) else {
        debug!(column = key_column, "key column absent, uniqueness not checked");
        return;
    };
    let mut seen: HashMap<String, u64> = HashMap::new();
    for key in labels(column) {
        *seen.entry(key).or_default() += 1;
    }
    let mut duplicated: Vec<(String, u64)> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
    if duplicated.is_empty() {
        return;
    }
    duplicated.sort();
    let extra: u64 = duplicated.iter().map(|(_, n)| n - 1).sum();
    let examples: Vec<&str> = duplicated.iter().take(5).map(|(k, _)| k.as_str()).collect();
    report.push(DataIssue::new(
        IssueKind::DuplicatePrimaryKey,
        Some(key_column),
        format!(
            "{} key(s) repeated, {extra} extra row(s); e.g. {}",
            duplicated.len(),
            examples.join(", ")
        ),
        extra,
    ));
}

/// Audits `data` without modifying it.
///
/// Fails with [`EdstatsError::Configuration`] when the requested year label
/// column is absent.
pub fn audit(data: &DataFrame, options: &AuditOptions) -> Result<AuditReport, EdstatsError> {
    let span = info_span!("audit", rows = data.height(), columns = data.width());
    let _guard = span.enter();

    let mut statistics = Vec::new();
    let mut masks: Vec<(String, Vec<bool>)> = Vec::with_capacity(data.width());
    for column in data.get_columns() {
        let name = column.name().to_string();
        if is_numeric(column.dtype()) {
            statistics.push(ColumnStats::describe(name.as_str(), &numeric_values(column)));
        }
        masks.push((name, null_mask(column)));
    }
    let null_counts: Vec<NullCount> = masks
        .iter()
        .map(|(name, mask)| NullCount {
            column: name.clone(),
            nulls: mask.iter().filter(|null| **null).count() as u64,
        })
        .collect();

    let nulls_by_year = options
        .year_label
        .as_deref()
        .map(|label| group_by_year(data, label, &masks))
        .transpose()?;

    let mut issues = QualityReport::new("audit");
    if let Some(key_column) = options.key_column.as_deref() {
        check_unique(data, key_column, &mut issues);
    }

    let report = AuditReport {
        rows: data.height(),
        statistics,
        null_counts,
        nulls_by_year,
        issues,
    };
    info!(
        numeric_columns = report.statistics.len(),
        nulls = report.total_nulls(),
        errors = report.issues.error_count(),
        "audited table"
    );
    Ok(report)
}
