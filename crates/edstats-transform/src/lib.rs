//! Aggregation of long enrollment tables into named grade-band summaries.

pub mod aggregate;
pub mod bands;
pub mod reported;

pub use aggregate::{AggregateOutcome, aggregate};
pub use bands::{BandStat, Family, families};
pub use reported::{REPORTED_SUMMARY, summarize_reported};
