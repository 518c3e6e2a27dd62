//! Decoding and encoding of compound column names.

use edstats_model::{ColumnSpec, EdstatsError, Gender, Grade, MetricKey, Race, SurveyYear};

/// Codec for `{YEAR}_{GRADE}_{RACE}_{GENDER}` and `{GRADE}_{RACE}_{GENDER}`
/// column names.
///
/// Some published years put the race token before the grade token
/// (`2009_AM_PK_M`). Decoding accepts that order when the standard order
/// does not parse; encoding always emits the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCodec {
    delimiter: char,
}

impl Default for ColumnCodec {
    fn default() -> Self {
        Self { delimiter: '_' }
    }
}

impl ColumnCodec {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn decode(&self, column: &str) -> Result<ColumnSpec, EdstatsError> {
        let tokens: Vec<&str> = column.split(self.delimiter).collect();
        match tokens.as_slice() {
            [year, rest @ ..] if rest.len() == 3 => {
                let year = SurveyYear::parse(year)
                    .ok_or_else(|| malformed(column, format!("`{year}` is not a survey year")))?;
                let metric = self.decode_metric(column, rest)?;
                Ok(ColumnSpec {
                    year: Some(year),
                    metric,
                })
            }
            tokens if tokens.len() == 3 => Ok(ColumnSpec {
                year: None,
                metric: self.decode_metric(column, tokens)?,
            }),
            tokens => Err(malformed(
                column,
                format!("expected 3 or 4 tokens, found {}", tokens.len()),
            )),
        }
    }

    fn decode_metric(&self, column: &str, tokens: &[&str]) -> Result<MetricKey, EdstatsError> {
        let [first, second, gender] = tokens else {
            return Err(malformed(column, "expected grade, race and gender tokens"));
        };
        let gender = Gender::from_token(gender)
            .ok_or_else(|| malformed(column, format!("unknown gender token `{gender}`")))?;
        if let (Some(grade), Some(race)) = (Grade::from_token(first), Race::from_token(second)) {
            return Ok(MetricKey::new(grade, race, gender));
        }
        if let (Some(race), Some(grade)) = (Race::from_token(first), Grade::from_token(second)) {
            return Ok(MetricKey::new(grade, race, gender));
        }
        Err(malformed(
            column,
            format!("`{first}`/`{second}` are not a grade and race pair"),
        ))
    }

    /// Canonical long-format column name for a metric.
    pub fn encode(&self, metric: &MetricKey) -> String {
        let d = self.delimiter;
        format!("{}{d}{}{d}{}", metric.grade, metric.race, metric.gender)
    }

    /// Canonical wide-format column name, year first when present.
    pub fn encode_spec(&self, spec: &ColumnSpec) -> String {
        match spec.year {
            Some(year) => format!("{year}{}{}", self.delimiter, self.encode(&spec.metric)),
            None => self.encode(&spec.metric),
        }
    }
}

fn malformed(column: &str, reason: impl Into<String>) -> EdstatsError {
    EdstatsError::MalformedColumnSpec {
        column: column.to_string(),
        reason: reason.into(),
    }
}
