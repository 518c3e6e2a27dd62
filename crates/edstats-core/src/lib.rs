//! Core normalization of column-coded education statistics tables.
//!
//! Wide tables name each metric column `{YEAR}_{GRADE}_{RACE}_{GENDER}`.
//! [`codec`] decodes those names, [`entity`] builds the synthetic
//! `PRIMARY_KEY`, and [`reshape`] pivots the wide table into one row per
//! entity and year.

pub mod codec;
pub mod entity;
pub mod frame;
pub mod merge;
pub mod reshape;

pub use codec::ColumnCodec;
pub use entity::{EntityIndex, EntityRow, normalize_entity, primary_key};
pub use frame::{LongFrame, infer_text_columns, table_to_frame};
pub use merge::merge_frames;
pub use reshape::{ReshapeOutcome, reshape_wide};
