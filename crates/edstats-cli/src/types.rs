use std::path::PathBuf;

use edstats_model::QualityReport;

/// Outcome of one stage run, printed as the command summary.
#[derive(Debug)]
pub struct StageResult {
    pub stage: String,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// SHA-256 of the written output.
    pub sha256: String,
    pub reports: Vec<QualityReport>,
    /// Stage-specific remarks (reconciled cells, skipped audit grouping).
    pub notes: Vec<String>,
}

impl StageResult {
    pub fn error_count(&self) -> usize {
        self.reports.iter().map(QualityReport::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(QualityReport::warning_count).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}
