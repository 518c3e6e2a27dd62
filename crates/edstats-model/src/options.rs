//! Configuration options for reshaping, aggregation and auditing.

use serde::{Deserialize, Serialize};

use crate::column::SurveyYear;
use crate::{PRIMARY_KEY, YEAR};

/// How embedded whitespace in an entity name is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// Collapse whitespace runs to one space (`NAMPA SCHOOL DISTRICT`).
    #[default]
    Spaced,
    /// Replace whitespace runs with `_` (`NEW_YORK`).
    Underscored,
}

/// A raw cell after sentinel normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Number(f64),
    /// Empty cell.
    Missing,
    /// A recognized "not reported" code or token.
    Sentinel,
    /// Text that is neither a number nor a sentinel.
    Unparseable,
}

impl CellValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            _ => None,
        }
    }
}

/// Immutable table of values that stand for "not reported".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelSet {
    /// Numeric codes (NCES uses -1 and -2).
    pub codes: Vec<f64>,
    /// Literal tokens (NCES uses `M`).
    pub tokens: Vec<String>,
}

impl Default for SentinelSet {
    fn default() -> Self {
        Self::nces()
    }
}

impl SentinelSet {
    /// Codes used by the enrollment and finance tables.
    pub fn nces() -> Self {
        Self {
            codes: vec![-1.0, -2.0],
            tokens: vec!["M".to_string()],
        }
    }

    /// Enrollment codes plus the em-dash used by the achievement tables.
    pub fn achievement() -> Self {
        let mut set = Self::nces();
        set.tokens.push("\u{2014}".to_string());
        set
    }

    pub fn is_sentinel_code(&self, value: f64) -> bool {
        self.codes.iter().any(|code| *code == value)
    }

    pub fn is_sentinel_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|candidate| candidate == token)
    }

    /// Normalizes one raw cell. Sentinels never survive as numbers.
    pub fn coerce(&self, raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }
        if self.is_sentinel_token(trimmed) {
            return CellValue::Sentinel;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_nan() => CellValue::Missing,
            Ok(value) if !value.is_finite() => CellValue::Unparseable,
            Ok(value) if self.is_sentinel_code(value) => CellValue::Sentinel,
            Ok(value) => CellValue::Number(value),
            Err(_) => CellValue::Unparseable,
        }
    }

    /// Masks sentinel codes in an already numeric cell.
    pub fn mask(&self, value: Option<f64>) -> Option<f64> {
        value.filter(|v| !v.is_nan() && !self.is_sentinel_code(*v))
    }
}

/// Options for the wide-to-long reshape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeOptions {
    /// Column holding the entity name in the wide table.
    pub entity_column: String,
    /// Additional identifying columns appended to the entity (e.g. the state
    /// of a district). Rows missing any of them are dropped.
    pub key_qualifiers: Vec<String>,
    /// Name of the entity column in the long table.
    pub entity_label: String,
    /// Per-row year column, for tables whose metric names carry no year.
    pub year_column: Option<String>,
    pub delimiter: char,
    pub key_style: KeyStyle,
    pub sentinels: SentinelSet,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            entity_column: "Agency Name".to_string(),
            key_qualifiers: Vec::new(),
            entity_label: "ENTITY".to_string(),
            year_column: None,
            delimiter: '_',
            key_style: KeyStyle::Spaced,
            sentinels: SentinelSet::nces(),
        }
    }
}

impl ReshapeOptions {
    /// State tables: `State Name` keyed as `STATE` with underscored names.
    pub fn states() -> Self {
        Self {
            entity_column: "State Name".to_string(),
            entity_label: "STATE".to_string(),
            key_style: KeyStyle::Underscored,
            ..Self::default()
        }
    }

    /// District tables: `Agency Name` qualified by `State Name`.
    pub fn districts() -> Self {
        Self {
            entity_column: "Agency Name".to_string(),
            key_qualifiers: vec!["State Name".to_string()],
            entity_label: "DISTRICT".to_string(),
            ..Self::default()
        }
    }

    pub fn with_entity_label(mut self, label: impl Into<String>) -> Self {
        self.entity_label = label.into();
        self
    }

    pub fn with_year_column(mut self, column: impl Into<String>) -> Self {
        self.year_column = Some(column.into());
        self
    }

    pub fn with_sentinels(mut self, sentinels: SentinelSet) -> Self {
        self.sentinels = sentinels;
        self
    }
}

/// Which aggregate families are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateScope {
    /// Only the all-students `_G` family.
    Totals,
    /// Totals, the seven race families and the fourteen race-by-gender families.
    #[default]
    Extended,
}

/// First year at which per-race aggregates may be rebuilt from gender splits.
pub const DEFAULT_RECONCILE_FROM: u16 = 2009;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    pub scope: AggregateScope,
    /// `None` reconciles every year.
    pub reconcile_from: Option<SurveyYear>,
    pub sentinels: SentinelSet,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            scope: AggregateScope::Extended,
            reconcile_from: Some(SurveyYear::new(DEFAULT_RECONCILE_FROM)),
            sentinels: SentinelSet::nces(),
        }
    }
}

impl AggregateOptions {
    pub fn totals() -> Self {
        Self {
            scope: AggregateScope::Totals,
            ..Self::default()
        }
    }

    pub fn reconcile_all_years(mut self) -> Self {
        self.reconcile_from = None;
        self
    }

    /// True when the reconciliation pass applies to `year`.
    pub fn reconciles(&self, year: Option<SurveyYear>) -> bool {
        match (self.reconcile_from, year) {
            (None, _) => true,
            (Some(boundary), Some(year)) => year >= boundary,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOptions {
    /// Column to group null counts by. `None` skips the grouped counts.
    pub year_label: Option<String>,
    /// Column whose values must be unique. `None` skips the check.
    pub key_column: Option<String>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            year_label: Some(YEAR.to_string()),
            key_column: Some(PRIMARY_KEY.to_string()),
        }
    }
}
