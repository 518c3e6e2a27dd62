//! Summary built from the totals the source tables publish themselves.

use anyhow::Result;
use edstats_core::LongFrame;
use edstats_model::{EdstatsError, SentinelSet};
use tracing::{debug, info};

/// Reported long column and the aggregate name it is published under.
pub const REPORTED_SUMMARY: [(&str, &str); 8] = [
    ("PK_A_A", "GRADES_PK_G"),
    ("KG_A_A", "GRADES_KG_G"),
    ("G04_A_A", "GRADES_4_G"),
    ("G08_A_A", "GRADES_8_G"),
    ("G12_A_A", "GRADES_12_G"),
    ("G01-G08_A_A", "GRADES_1_8_G"),
    ("G09-G12_A_A", "GRADES_9_12_G"),
    ("A_A_A", "GRADES_ALL_G"),
];

/// Selects and renames the reported totals. Absent sources become
/// all-missing columns.
pub fn summarize_reported(frame: &LongFrame, sentinels: &SentinelSet) -> Result<LongFrame> {
    if frame.record_count() == 0 {
        return Err(EdstatsError::EmptyOutput {
            stage: "summarize".to_string(),
        }
        .into());
    }
    let height = frame.record_count();
    let mut metrics = Vec::with_capacity(REPORTED_SUMMARY.len());
    let mut absent = 0usize;
    for (source, target) in REPORTED_SUMMARY {
        let values = match frame.metric_values(source)? {
            Some(values) => values.into_iter().map(|v| sentinels.mask(v)).collect(),
            None => {
                debug!(column = source, "reported column absent");
                absent += 1;
                vec![None; height]
            }
        };
        metrics.push((target.to_string(), values));
    }
    let out = frame.derive(metrics)?;
    info!(rows = height, absent, "selected reported summary");
    Ok(out)
}
