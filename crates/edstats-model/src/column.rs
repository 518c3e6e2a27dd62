use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab::{Gender, Grade, Race};

/// Four-digit survey year, the leading token of a year-stamped column name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurveyYear(u16);

impl SurveyYear {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    /// Parses exactly four ASCII digits.
    pub fn parse(token: &str) -> Option<Self> {
        if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        token.parse().ok().map(Self)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SurveyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// The (grade, race, gender) triple that names one long-format metric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub grade: Grade,
    pub race: Race,
    pub gender: Gender,
}

impl MetricKey {
    pub fn new(grade: Grade, race: Race, gender: Gender) -> Self {
        Self {
            grade,
            race,
            gender,
        }
    }

    /// Canonical `{grade}_{race}_{gender}` column name.
    pub fn column_name(&self) -> String {
        format!("{}_{}_{}", self.grade, self.race, self.gender)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name())
    }
}

/// A decoded compound column name.
///
/// `year` is `None` for tables that carry the survey year per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub year: Option<SurveyYear>,
    pub metric: MetricKey,
}
