//! File-to-file stage runners used by the subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use edstats_core::{LongFrame, infer_text_columns, merge_frames, reshape_wide, table_to_frame};
use edstats_ingest::{
    CsvTable, LabelVocabulary, ReadOptions, read_csv_table, read_csv_table_with_options,
    translate_tables, write_csv, write_table,
};
use edstats_model::{
    AggregateOptions, AuditOptions, EdstatsError, PRIMARY_KEY, QualityReport, ReshapeOptions,
    SentinelSet,
};
use edstats_transform::{aggregate as aggregate_frame, summarize_reported};
use edstats_validate::{audit as audit_frame, write_audit_json};

use crate::hash::sha256_hex;
use crate::types::StageResult;

struct Written {
    output: PathBuf,
    rows: usize,
    columns: usize,
    bytes: Vec<u8>,
}

fn finish(
    stage: &str,
    inputs: Vec<PathBuf>,
    written: Written,
    reports: Vec<QualityReport>,
    notes: Vec<String>,
) -> StageResult {
    let sha256 = sha256_hex(&written.bytes);
    info!(
        stage,
        output = %written.output.display(),
        rows = written.rows,
        sha256 = %sha256,
        "wrote output"
    );
    StageResult {
        stage: stage.to_string(),
        inputs,
        output: written.output,
        rows: written.rows,
        columns: written.columns,
        sha256,
        reports,
        notes,
    }
}

fn write_long(frame: &LongFrame, output: &Path) -> Result<Written> {
    let bytes = write_csv(&frame.data, output)?;
    Ok(Written {
        output: output.to_path_buf(),
        rows: frame.record_count(),
        columns: frame.data.width(),
        bytes,
    })
}

/// Entity column of a long table: the column after `PRIMARY_KEY`.
pub fn entity_label_of(table: &CsvTable) -> Result<String> {
    match table.headers.as_slice() {
        [first, entity, ..] if first == PRIMARY_KEY => Ok(entity.clone()),
        _ => Err(EdstatsError::configuration(format!(
            "a long table starts with `{PRIMARY_KEY}` followed by the entity column"
        ))
        .into()),
    }
}

/// Loads a long table written by `reshape`, `aggregate`, `summarize` or
/// `merge`.
pub fn load_long(path: &Path, sentinels: &SentinelSet) -> Result<(LongFrame, QualityReport)> {
    let table = read_csv_table(path)?;
    let entity_label = entity_label_of(&table).with_context(|| format!("load {}", path.display()))?;
    LongFrame::from_table(&table, &entity_label, sentinels)
        .with_context(|| format!("load {}", path.display()))
}

/// Translates raw published exports into one compound-coded wide table.
pub fn translate(inputs: &[PathBuf], output: &Path, read: ReadOptions) -> Result<StageResult> {
    let tables = inputs
        .iter()
        .map(|path| read_csv_table_with_options(path, read))
        .collect::<Result<Vec<_>>>()?;
    let wide = translate_tables(&LabelVocabulary::nces(), &tables);
    if wide.height() == 0 {
        return Err(EdstatsError::EmptyOutput {
            stage: "translate".to_string(),
        }
        .into());
    }
    let bytes = write_table(&wide, output)?;
    let written = Written {
        output: output.to_path_buf(),
        rows: wide.height(),
        columns: wide.headers.len(),
        bytes,
    };
    Ok(finish("translate", inputs.to_vec(), written, Vec::new(), Vec::new()))
}

pub fn reshape(input: &Path, output: &Path, options: &ReshapeOptions) -> Result<StageResult> {
    let table = read_csv_table(input)?;
    let outcome = reshape_wide(&table, options)
        .with_context(|| format!("reshape {}", input.display()))?;
    let years: Vec<String> = outcome.years.iter().map(ToString::to_string).collect();
    let notes = vec![format!(
        "{} entities over {} year(s): {}",
        outcome.entities,
        years.len(),
        years.join(" ")
    )];
    let written = write_long(&outcome.frame, output)?;
    Ok(finish(
        "reshape",
        vec![input.to_path_buf()],
        written,
        vec![outcome.report],
        notes,
    ))
}

pub fn aggregate(input: &Path, output: &Path, options: &AggregateOptions) -> Result<StageResult> {
    let (frame, load_report) = load_long(input, &options.sentinels)?;
    let outcome = aggregate_frame(&frame, options)
        .with_context(|| format!("aggregate {}", input.display()))?;
    let mut notes = vec![format!(
        "{} cell(s) filled from gender splits",
        outcome.reconciled
    )];
    if !outcome.absent_sources.is_empty() {
        notes.push(format!(
            "{} source column(s) absent, treated as missing",
            outcome.absent_sources.len()
        ));
    }
    let written = write_long(&outcome.frame, output)?;
    Ok(finish(
        "aggregate",
        vec![input.to_path_buf()],
        written,
        vec![load_report, outcome.report],
        notes,
    ))
}

pub fn summarize(input: &Path, output: &Path, sentinels: &SentinelSet) -> Result<StageResult> {
    let (frame, load_report) = load_long(input, sentinels)?;
    let summary = summarize_reported(&frame, sentinels)
        .with_context(|| format!("summarize {}", input.display()))?;
    let written = write_long(&summary, output)?;
    Ok(finish(
        "summarize",
        vec![input.to_path_buf()],
        written,
        vec![load_report],
        Vec::new(),
    ))
}

pub fn merge(inputs: &[PathBuf], output: &Path, sentinels: &SentinelSet) -> Result<StageResult> {
    let mut frames = Vec::with_capacity(inputs.len());
    let mut reports = Vec::with_capacity(inputs.len());
    for path in inputs {
        let (frame, report) = load_long(path, sentinels)?;
        frames.push(frame);
        reports.push(report);
    }
    let merged = merge_frames(&frames)?;
    let written = write_long(&merged, output)?;
    Ok(finish("merge", inputs.to_vec(), written, reports, Vec::new()))
}

/// Audits any finished CSV table and writes the JSON report.
///
/// An absent year label is reported as a note and the audit is repeated
/// without the grouped counts.
pub fn audit(
    input: &Path,
    output: &Path,
    options: &AuditOptions,
    sentinels: &SentinelSet,
) -> Result<StageResult> {
    let table = read_csv_table(input)?;
    let text_columns = infer_text_columns(&table, sentinels);
    let text_refs: Vec<&str> = text_columns.iter().map(String::as_str).collect();
    let (data, load_report) = table_to_frame(&table, &text_refs, sentinels)?;

    let mut notes = Vec::new();
    let report = match audit_frame(&data, options) {
        Ok(report) => report,
        Err(EdstatsError::Configuration { message }) => {
            warn!(%message, "year grouping skipped");
            notes.push(message);
            let ungrouped = AuditOptions {
                year_label: None,
                ..options.clone()
            };
            audit_frame(&data, &ungrouped)?
        }
        Err(other) => return Err(other.into()),
    };
    let bytes = write_audit_json(&report, output)?;
    let written = Written {
        output: output.to_path_buf(),
        rows: report.rows,
        columns: data.width(),
        bytes,
    };
    Ok(finish(
        "audit",
        vec![input.to_path_buf()],
        written,
        vec![load_report, report.issues],
        notes,
    ))
}
