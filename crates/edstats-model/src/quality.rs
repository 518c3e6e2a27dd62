use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Kinds of per-cell and per-row faults that are counted rather than raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedColumnSpec,
    MissingJoinKey,
    AmbiguousAggregateInput,
    /// Entity rows that normalize to an already seen entity.
    DuplicateEntity,
    /// Two source cells landing on the same (key, metric) destination.
    CellCollision,
    /// Non-numeric values that are not recognized sentinels.
    UnparseableValue,
    DuplicatePrimaryKey,
}

impl IssueKind {
    pub fn severity(self) -> IssueSeverity {
        match self {
            Self::DuplicatePrimaryKey => IssueSeverity::Error,
            _ => IssueSeverity::Warning,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MalformedColumnSpec => "MalformedColumnSpec",
            Self::MissingJoinKey => "MissingJoinKey",
            Self::AmbiguousAggregateInput => "AmbiguousAggregateInput",
            Self::DuplicateEntity => "DuplicateEntity",
            Self::CellCollision => "CellCollision",
            Self::UnparseableValue => "UnparseableValue",
            Self::DuplicatePrimaryKey => "DuplicatePrimaryKey",
        }
    }
}

/// A data-quality issue found while running a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIssue {
    pub kind: IssueKind,
    /// Column the issue concerns (if applicable).
    pub column: Option<String>,
    pub message: String,
    /// Count of occurrences.
    pub count: u64,
}

impl DataIssue {
    pub fn new(
        kind: IssueKind,
        column: Option<&str>,
        message: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            kind,
            column: column.map(str::to_string),
            message: message.into(),
            count,
        }
    }

    pub fn severity(&self) -> IssueSeverity {
        self.kind.severity()
    }
}

/// Issues collected by one stage, returned alongside its output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub stage: String,
    pub issues: Vec<DataIssue>,
}

impl QualityReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            issues: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: DataIssue) {
        self.issues.push(issue);
    }

    /// Sum of occurrence counts for one kind.
    pub fn total(&self, kind: IssueKind) -> u64 {
        self.issues
            .iter()
            .filter(|issue| issue.kind == kind)
            .map(|issue| issue.count)
            .sum()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
