//! Full outer merge of long frames on (`PRIMARY_KEY`, entity, `YEAR`).

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tracing::{info, info_span};

use edstats_model::{EdstatsError, SurveyYear};

use crate::frame::{LongFrame, build_long_data};

/// Merges frames that share an entity label.
///
/// Every key present in any input appears once in the output, sorted by
/// `PRIMARY_KEY`. Metric columns keep input order; a name appearing in two
/// inputs is rejected.
pub fn merge_frames(frames: &[LongFrame]) -> Result<LongFrame> {
    let span = info_span!("merge", inputs = frames.len());
    let _guard = span.enter();

    let Some(first) = frames.first() else {
        return Err(EdstatsError::configuration("merge needs at least one input").into());
    };
    let entity_label = first.entity_label.clone();
    if let Some(other) = frames.iter().find(|f| f.entity_label != entity_label) {
        return Err(EdstatsError::configuration(format!(
            "cannot merge `{}` frames with `{}` frames",
            other.entity_label, entity_label
        ))
        .into());
    }

    let mut seen_columns = BTreeSet::new();
    for frame in frames {
        for name in frame.metric_names() {
            if !seen_columns.insert(name.clone()) {
                return Err(EdstatsError::DuplicateColumn { column: name }.into());
            }
        }
    }

    let mut keys: BTreeMap<String, (String, Option<SurveyYear>)> = BTreeMap::new();
    let mut frame_keys = Vec::with_capacity(frames.len());
    for frame in frames {
        let pks = frame.primary_keys()?;
        let entities = frame.entities()?;
        let years = frame.years()?;
        for ((pk, entity), year) in pks.iter().zip(entities).zip(years) {
            keys.entry(pk.clone()).or_insert((entity, year));
        }
        frame_keys.push(pks);
    }
    if keys.is_empty() {
        return Err(EdstatsError::EmptyOutput {
            stage: "merge".to_string(),
        }
        .into());
    }
    let positions: BTreeMap<&str, usize> = keys
        .keys()
        .enumerate()
        .map(|(pos, key)| (key.as_str(), pos))
        .collect();

    let height = keys.len();
    let mut metrics: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for (frame, pks) in frames.iter().zip(&frame_keys) {
        for name in frame.metric_names() {
            let source = frame.metric_values(&name)?.unwrap_or_default();
            let mut merged = vec![None; height];
            for (pk, value) in pks.iter().zip(source) {
                if let Some(&pos) = positions.get(pk.as_str()) {
                    merged[pos] = value;
                }
            }
            metrics.push((name, merged));
        }
    }

    let mut pk_values = Vec::with_capacity(height);
    let mut entities = Vec::with_capacity(height);
    let mut years = Vec::with_capacity(height);
    for (pk, (entity, year)) in &keys {
        pk_values.push(pk.clone());
        entities.push(entity.clone());
        years.push(year.map(|y| i32::from(y.value())));
    }
    let columns = metrics.len();
    let data = build_long_data(&entity_label, pk_values, entities, years, metrics)?;
    info!(rows = height, columns, "merged long frames");
    Ok(LongFrame::new(entity_label, data))
}
