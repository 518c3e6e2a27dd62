use thiserror::Error;

use crate::quality::IssueKind;

#[derive(Debug, Error)]
pub enum EdstatsError {
    #[error("malformed column spec `{column}`: {reason}")]
    MalformedColumnSpec { column: String, reason: String },

    #[error("{dropped} row(s) have no value in join column `{column}`")]
    MissingJoinKey { column: String, dropped: usize },

    #[error(
        "`{column}` for {primary_key} is {reported} but its gender split sums to {split_sum}"
    )]
    AmbiguousAggregateInput {
        column: String,
        primary_key: String,
        reported: f64,
        split_sum: f64,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("{stage} produced no output rows")]
    EmptyOutput { stage: String },

    #[error("column `{column}` is present in more than one merge input")]
    DuplicateColumn { column: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EdstatsError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Data-quality kind for errors that are recorded instead of raised.
    pub fn issue_kind(&self) -> Option<IssueKind> {
        match self {
            Self::MalformedColumnSpec { .. } => Some(IssueKind::MalformedColumnSpec),
            Self::MissingJoinKey { .. } => Some(IssueKind::MissingJoinKey),
            Self::AmbiguousAggregateInput { .. } => Some(IssueKind::AmbiguousAggregateInput),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EdstatsError>;
