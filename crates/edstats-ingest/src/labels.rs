//! Translation of verbose published column labels into compound names.
//!
//! NCES exports label columns like
//! `Grade 3 Students - Hispanic - female [District] 2016-17`. These are
//! rewritten to `{YEAR}_{GRADE}_{RACE}_{GENDER}` before reshaping.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::csv_table::CsvTable;

/// Placeholder year for labels without a four-digit year. It fails the
/// column-name grammar, so such columns are skipped downstream.
pub const UNKNOWN_YEAR: &str = "Y?";

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern compiles"));

/// Ordered keyword tables. The first keyword contained in the lowercased
/// label wins, so longer keywords precede their prefixes.
#[derive(Debug, Clone)]
pub struct LabelVocabulary {
    identity_columns: Vec<String>,
    grades: Vec<(String, String)>,
    races: Vec<(String, String)>,
    genders: Vec<(String, String)>,
}

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(keyword, token)| ((*keyword).to_string(), (*token).to_string()))
        .collect()
}

impl LabelVocabulary {
    pub fn nces() -> Self {
        Self {
            identity_columns: vec!["State Name".to_string(), "Agency Name".to_string()],
            grades: pairs(&[
                ("prekindergarten", "PK"),
                ("kindergarten", "KG"),
                ("grades 1-8", "G01-G08"),
                ("grades 9-12", "G09-G12"),
                ("grade 10", "G10"),
                ("grade 11", "G11"),
                ("grade 12", "G12"),
                ("grade 13", "G13"),
                ("grade 1", "G01"),
                ("grade 2", "G02"),
                ("grade 3", "G03"),
                ("grade 4", "G04"),
                ("grade 5", "G05"),
                ("grade 6", "G06"),
                ("grade 7", "G07"),
                ("grade 8", "G08"),
                ("grade 9", "G09"),
                ("ungraded", "UG"),
                ("adult education", "AE"),
            ]),
            races: pairs(&[
                ("indian", "AM"),
                ("asian", "AS"),
                ("hispanic", "HI"),
                ("black", "BL"),
                ("white", "WH"),
                ("hawaiian", "HP"),
                ("two or more", "TR"),
            ]),
            genders: pairs(&[("female", "F"), ("male", "M")]),
        }
    }

    pub fn identity_columns(&self) -> &[String] {
        &self.identity_columns
    }

    /// Translates one label. Identity labels collapse to their bare name.
    pub fn translate(&self, label: &str) -> String {
        if let Some(identity) = self
            .identity_columns
            .iter()
            .find(|identity| label.contains(identity.as_str()))
        {
            return identity.clone();
        }
        let lowered = label.to_lowercase();
        let year = YEAR_PATTERN
            .find(&lowered)
            .map_or(UNKNOWN_YEAR, |m| m.as_str());
        let grade = first_match(&self.grades, &lowered);
        let race = first_match(&self.races, &lowered);
        let gender = first_match(&self.genders, &lowered);
        format!("{year}_{grade}_{race}_{gender}")
    }
}

fn first_match<'a>(table: &'a [(String, String)], label: &str) -> &'a str {
    table
        .iter()
        .find(|(keyword, _)| label.contains(keyword.as_str()))
        .map_or("A", |(_, token)| token.as_str())
}

/// Translates and joins raw tables side by side.
///
/// Rows are aligned by position. Repeated translated names keep the first
/// column. Identity columns lead, the rest follow in sorted order.
pub fn translate_tables(vocabulary: &LabelVocabulary, tables: &[CsvTable]) -> CsvTable {
    let mut seen = BTreeSet::new();
    let mut sources: Vec<(String, usize, usize)> = Vec::new();
    let mut duplicates = 0usize;
    for (table_idx, table) in tables.iter().enumerate() {
        for (col_idx, label) in table.headers.iter().enumerate() {
            let name = vocabulary.translate(label);
            if seen.insert(name.clone()) {
                sources.push((name, table_idx, col_idx));
            } else {
                debug!(label = %label, translated = %name, "dropping repeated column");
                duplicates += 1;
            }
        }
    }
    sources.sort_by(|a, b| {
        let rank_a = identity_rank(vocabulary, &a.0);
        let rank_b = identity_rank(vocabulary, &b.0);
        rank_a.cmp(&rank_b).then_with(|| a.0.cmp(&b.0))
    });
    let height = tables.iter().map(CsvTable::height).max().unwrap_or(0);
    let rows = (0..height)
        .map(|row| {
            sources
                .iter()
                .map(|(_, table_idx, col_idx)| tables[*table_idx].cell(row, *col_idx).to_string())
                .collect()
        })
        .collect();
    let headers: Vec<String> = sources.into_iter().map(|(name, _, _)| name).collect();
    info!(
        tables = tables.len(),
        columns = headers.len(),
        duplicates,
        rows = height,
        "translated raw labels"
    );
    CsvTable::new(headers, rows)
}

fn identity_rank(vocabulary: &LabelVocabulary, name: &str) -> usize {
    vocabulary
        .identity_columns
        .iter()
        .position(|identity| identity == name)
        .unwrap_or(vocabulary.identity_columns.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_nces_labels() {
        let vocab = LabelVocabulary::nces();
        assert_eq!(
            vocab.translate("Grade 3 Students - Hispanic - female [District] 2016-17"),
            "2016_G03_HI_F"
        );
        assert_eq!(
            vocab.translate("Grade 10 Students [Public School] 2012-13"),
            "2012_G10_A_A"
        );
        assert_eq!(
            vocab.translate("Prekindergarten Students - American Indian/Alaska Native - male 2009-10"),
            "2009_PK_AM_M"
        );
        assert_eq!(vocab.translate("Total Students [District] 2017-18"), "2017_A_A_A");
        assert_eq!(vocab.translate("Agency Name"), "Agency Name");
        assert_eq!(vocab.translate("State Name [District] Latest available year"), "State Name");
        assert_eq!(vocab.translate("Kindergarten Students"), "Y?_KG_A_A");
    }
}
