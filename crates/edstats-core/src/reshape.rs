//! Wide-to-long reshaping of column-coded tables.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tracing::{debug, info, info_span, warn};

use edstats_ingest::CsvTable;
use edstats_model::{
    CellValue, DataIssue, EdstatsError, IssueKind, QualityReport, ReshapeOptions, SurveyYear,
};

use crate::codec::ColumnCodec;
use crate::entity::{EntityIndex, primary_key};
use crate::frame::{LongFrame, build_long_data};

/// Result of [`reshape_wide`].
#[derive(Debug, Clone)]
pub struct ReshapeOutcome {
    pub frame: LongFrame,
    pub report: QualityReport,
    /// Distinct survey years, ascending.
    pub years: Vec<SurveyYear>,
    /// Entities kept after key normalization.
    pub entities: usize,
}

#[derive(Debug)]
struct SourceColumn<'a> {
    idx: usize,
    name: &'a str,
    year: Option<SurveyYear>,
    slot: usize,
}

/// Pivots a wide table into one row per (entity, year).
///
/// Output rows cover every entity for every observed year, sorted by
/// `PRIMARY_KEY`; metric columns are sorted by canonical name. Cells are
/// parsed as numbers with sentinels and unparseable text becoming null.
/// When two source columns land on the same cell the later present value
/// wins; a missing value never overwrites.
pub fn reshape_wide(table: &CsvTable, options: &ReshapeOptions) -> Result<ReshapeOutcome> {
    let span = info_span!("reshape", entity = %options.entity_label);
    let _guard = span.enter();

    let codec = ColumnCodec::new(options.delimiter);
    let mut report = QualityReport::new("reshape");
    let index = EntityIndex::build(table, options, &mut report)?;

    let mut identifying: BTreeSet<&str> = BTreeSet::new();
    identifying.insert(options.entity_column.as_str());
    identifying.extend(options.key_qualifiers.iter().map(String::as_str));
    if let Some(year_column) = options.year_column.as_deref() {
        identifying.insert(year_column);
    }

    let mut decoded = Vec::new();
    let mut metric_names: BTreeSet<String> = BTreeSet::new();
    for (idx, name) in table.headers.iter().enumerate() {
        if identifying.contains(name.as_str()) {
            continue;
        }
        let spec = codec.decode(name).and_then(|spec| {
            if spec.year.is_none() && options.year_column.is_none() {
                Err(EdstatsError::MalformedColumnSpec {
                    column: name.clone(),
                    reason: "no survey year in the name and no per-row year column".to_string(),
                })
            } else {
                Ok(spec)
            }
        });
        match spec {
            Ok(spec) => {
                let metric = codec.encode(&spec.metric);
                metric_names.insert(metric.clone());
                decoded.push((idx, name.as_str(), spec.year, metric));
            }
            Err(error) => {
                warn!(column = %name, "{error}");
                report.push(DataIssue::new(
                    IssueKind::MalformedColumnSpec,
                    Some(name.as_str()),
                    error.to_string(),
                    1,
                ));
            }
        }
    }
    let slots: BTreeMap<&str, usize> = metric_names
        .iter()
        .enumerate()
        .map(|(slot, name)| (name.as_str(), slot))
        .collect();
    let sources: Vec<SourceColumn<'_>> = decoded
        .iter()
        .map(|(idx, name, year, metric)| SourceColumn {
            idx: *idx,
            name: *name,
            year: *year,
            slot: slots[metric.as_str()],
        })
        .collect();

    let mut years: BTreeSet<SurveyYear> = sources.iter().filter_map(|s| s.year).collect();
    years.extend(index.rows.iter().filter_map(|row| row.year));
    let entities = index.entities();

    let mut layout: Vec<(String, &str, SurveyYear)> = entities
        .iter()
        .flat_map(|entity| {
            years
                .iter()
                .map(move |year| (primary_key(*year, entity), *entity, *year))
        })
        .collect();
    layout.sort_by(|a, b| a.0.cmp(&b.0));
    if layout.is_empty() {
        return Err(EdstatsError::EmptyOutput {
            stage: "reshape".to_string(),
        }
        .into());
    }
    let positions: BTreeMap<(&str, SurveyYear), usize> = layout
        .iter()
        .enumerate()
        .map(|(pos, (_, entity, year))| ((*entity, *year), pos))
        .collect();

    let height = layout.len();
    let mut values: Vec<Vec<Option<f64>>> = vec![vec![None; height]; metric_names.len()];
    let mut sentinel_cells = 0usize;
    for source in &sources {
        let mut collisions = 0u64;
        let mut unparseable = 0u64;
        for entity_row in &index.rows {
            let Some(year) = source.year.or(entity_row.year) else {
                continue;
            };
            let Some(&pos) = positions.get(&(entity_row.entity.as_str(), year)) else {
                continue;
            };
            match options.sentinels.coerce(table.cell(entity_row.row, source.idx)) {
                CellValue::Number(value) => {
                    let cell = &mut values[source.slot][pos];
                    if cell.is_some() {
                        collisions += 1;
                    }
                    *cell = Some(value);
                }
                CellValue::Sentinel => sentinel_cells += 1,
                CellValue::Unparseable => unparseable += 1,
                CellValue::Missing => {}
            }
        }
        if collisions > 0 {
            warn!(
                column = %source.name,
                cells = collisions,
                "column overwrites values already written for the same year and metric"
            );
            report.push(DataIssue::new(
                IssueKind::CellCollision,
                Some(source.name),
                format!("{collisions} cell(s) overwritten by a later column"),
                collisions,
            ));
        }
        if unparseable > 0 {
            debug!(column = %source.name, cells = unparseable, "non-numeric cells set to missing");
            report.push(DataIssue::new(
                IssueKind::UnparseableValue,
                Some(source.name),
                format!("{unparseable} non-numeric value(s) treated as missing"),
                unparseable,
            ));
        }
    }
    debug!(cells = sentinel_cells, "sentinel cells set to missing");

    let keys: Vec<String> = layout.iter().map(|(key, _, _)| key.clone()).collect();
    let entity_values: Vec<String> = layout
        .iter()
        .map(|(_, entity, _)| (*entity).to_string())
        .collect();
    let year_values: Vec<Option<i32>> = layout
        .iter()
        .map(|(_, _, year)| Some(i32::from(year.value())))
        .collect();
    let metrics: Vec<(String, Vec<Option<f64>>)> = metric_names.into_iter().zip(values).collect();
    let metric_count = metrics.len();
    let data = build_long_data(&options.entity_label, keys, entity_values, year_values, metrics)?;

    info!(
        entities = entities.len(),
        years = years.len(),
        metrics = metric_count,
        rows = height,
        skipped_columns = report.total(IssueKind::MalformedColumnSpec),
        "reshaped wide table"
    );
    Ok(ReshapeOutcome {
        frame: LongFrame::new(options.entity_label.clone(), data),
        report,
        years: years.into_iter().collect(),
        entities: entities.len(),
    })
}
