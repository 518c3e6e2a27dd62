pub mod column;
pub mod error;
pub mod options;
pub mod quality;
pub mod vocab;

pub use column::{ColumnSpec, MetricKey, SurveyYear};
pub use error::{EdstatsError, Result};
pub use options::{
    AggregateOptions, AggregateScope, AuditOptions, CellValue, KeyStyle, ReshapeOptions,
    SentinelSet,
};
pub use quality::{DataIssue, IssueKind, IssueSeverity, QualityReport};
pub use vocab::{Gender, Grade, Race};

/// Name of the synthetic key column of every long table.
pub const PRIMARY_KEY: &str = "PRIMARY_KEY";

/// Name of the survey-year column of every long table.
pub const YEAR: &str = "YEAR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_report_counts() {
        let mut report = QualityReport::new("reshape");
        report.push(DataIssue::new(
            IssueKind::MalformedColumnSpec,
            Some("2017_A_A"),
            "expected 4 tokens",
            1,
        ));
        report.push(DataIssue::new(
            IssueKind::DuplicatePrimaryKey,
            Some(PRIMARY_KEY),
            "duplicate key",
            2,
        ));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert!(report.has_errors());
        assert_eq!(report.total(IssueKind::DuplicatePrimaryKey), 2);
    }

    #[test]
    fn report_serializes() {
        let mut report = QualityReport::new("aggregate");
        report.push(DataIssue::new(
            IssueKind::AmbiguousAggregateInput,
            Some("GRADES_PK_AM"),
            "reported 20, split sum 18",
            1,
        ));
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"ambiguous_aggregate_input\""));
        let round: QualityReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round.stage, "aggregate");
        assert_eq!(round.issues.len(), 1);
    }
}
