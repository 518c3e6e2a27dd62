//! Quality review of finished tables: descriptive statistics, null counts
//! overall and by year, and primary-key uniqueness.

mod audit;
mod stats;

pub use audit::{AuditReport, NullCount, YearNulls, audit};
pub use stats::ColumnStats;

use std::path::Path;

use anyhow::{Context, Result};

/// Writes `report` as pretty JSON with a trailing newline.
pub fn write_audit_json(report: &AuditReport, path: &Path) -> Result<Vec<u8>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize audit report")?;
    let bytes = format!("{json}\n").into_bytes();
    std::fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(bytes)
}
