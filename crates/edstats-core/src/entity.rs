//! Entity name normalization and primary key construction.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tracing::{info, warn};

use edstats_ingest::CsvTable;
use edstats_model::{
    DataIssue, EdstatsError, IssueKind, KeyStyle, QualityReport, ReshapeOptions, SurveyYear,
};

/// Trims, uppercases and collapses embedded whitespace. Returns `None` when
/// nothing is left.
pub fn normalize_entity(raw: &str, style: KeyStyle) -> Option<String> {
    let separator = match style {
        KeyStyle::Spaced => " ",
        KeyStyle::Underscored => "_",
    };
    let normalized = raw
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(separator);
    (!normalized.is_empty()).then_some(normalized)
}

/// `{YEAR}_{ENTITY}`. The year is always four digits, so the key is
/// injective over (entity, year).
pub fn primary_key(year: SurveyYear, entity: &str) -> String {
    format!("{year}_{entity}")
}

/// A wide-table row that survived key normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    /// Index into the source table rows.
    pub row: usize,
    pub entity: String,
    /// Year taken from the per-row year column, if configured.
    pub year: Option<SurveyYear>,
}

/// Surviving rows of a wide table, first occurrence per identity.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    pub rows: Vec<EntityRow>,
    /// Rows without an entity or qualifier value.
    pub dropped: usize,
    /// Rows whose per-row year cell is blank or not a year.
    pub dropped_years: usize,
    pub duplicates: usize,
}

impl EntityIndex {
    /// Collects entity rows from `table`.
    ///
    /// Rows without an entity (or qualifier, or year in per-row year mode)
    /// are dropped and counted as missing join keys against the column that
    /// lacked a value. Rows whose normalized identity was already seen are
    /// dropped, keeping the first.
    ///
    /// Fails with [`EdstatsError::Configuration`] when two different
    /// identities render to the same entity key, e.g. `("Foo_Bar", "Baz")`
    /// and `("Foo", "Bar_Baz")`.
    pub fn build(
        table: &CsvTable,
        options: &ReshapeOptions,
        report: &mut QualityReport,
    ) -> Result<Self> {
        let entity_idx = require_column(table, &options.entity_column)?;
        let qualifier_idx = options
            .key_qualifiers
            .iter()
            .map(|name| require_column(table, name))
            .collect::<Result<Vec<_>>>()?;
        let year_idx = options
            .year_column
            .as_deref()
            .map(|name| require_column(table, name))
            .transpose()?;

        let mut index = EntityIndex::default();
        let mut seen: BTreeMap<(String, Option<SurveyYear>), Vec<String>> = BTreeMap::new();
        for row in 0..table.height() {
            let Some(parts) = row_identity(table, row, entity_idx, &qualifier_idx, options)
            else {
                index.dropped += 1;
                continue;
            };
            let year = match year_idx {
                Some(idx) => match SurveyYear::parse(table.cell(row, idx)) {
                    Some(year) => Some(year),
                    None => {
                        index.dropped_years += 1;
                        continue;
                    }
                },
                None => None,
            };
            let entity = parts.join("_");
            match seen.entry((entity.clone(), year)) {
                Entry::Occupied(first) if *first.get() == parts => {
                    index.duplicates += 1;
                    continue;
                }
                Entry::Occupied(first) => {
                    return Err(EdstatsError::configuration(format!(
                        "entity key `{entity}` is produced by both ({}) and ({}); \
                         choose key qualifiers or a key style that keeps them apart",
                        first.get().join(", "),
                        parts.join(", ")
                    ))
                    .into());
                }
                Entry::Vacant(slot) => {
                    slot.insert(parts);
                }
            }
            index.rows.push(EntityRow { row, entity, year });
        }

        if index.dropped > 0 {
            report_missing_keys(report, &options.entity_column, index.dropped);
        }
        if index.dropped_years > 0
            && let Some(column) = options.year_column.as_deref()
        {
            report_missing_keys(report, column, index.dropped_years);
        }
        if index.duplicates > 0 {
            info!(
                column = %options.entity_column,
                duplicates = index.duplicates,
                "dropped repeated entity rows, keeping first"
            );
            report.push(DataIssue::new(
                IssueKind::DuplicateEntity,
                Some(options.entity_column.as_str()),
                format!("{} repeated entity row(s) dropped", index.duplicates),
                index.duplicates as u64,
            ));
        }
        Ok(index)
    }

    /// Distinct entities in sorted order.
    pub fn entities(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.entity.as_str()).collect()
    }
}

fn report_missing_keys(report: &mut QualityReport, column: &str, dropped: usize) {
    let error = EdstatsError::MissingJoinKey {
        column: column.to_string(),
        dropped,
    };
    warn!(column, dropped, "{error}");
    report.push(DataIssue::new(
        IssueKind::MissingJoinKey,
        Some(column),
        error.to_string(),
        dropped as u64,
    ));
}

/// Normalized entity followed by its normalized qualifiers.
fn row_identity(
    table: &CsvTable,
    row: usize,
    entity_idx: usize,
    qualifier_idx: &[usize],
    options: &ReshapeOptions,
) -> Option<Vec<String>> {
    std::iter::once(entity_idx)
        .chain(qualifier_idx.iter().copied())
        .map(|idx| normalize_entity(table.cell(row, idx), options.key_style))
        .collect()
}

fn require_column(table: &CsvTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| {
        EdstatsError::configuration(format!("column `{name}` not found in wide table")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_entity_names() {
        assert_eq!(
            normalize_entity("  Nampa   School\tDistrict ", KeyStyle::Spaced).as_deref(),
            Some("NAMPA SCHOOL DISTRICT")
        );
        assert_eq!(
            normalize_entity("New York", KeyStyle::Underscored).as_deref(),
            Some("NEW_YORK")
        );
        assert_eq!(normalize_entity("   ", KeyStyle::Spaced), None);
    }

    #[test]
    fn builds_primary_key() {
        assert_eq!(
            primary_key(SurveyYear::new(2017), "NAMPA SCHOOL DISTRICT"),
            "2017_NAMPA SCHOOL DISTRICT"
        );
    }
}
