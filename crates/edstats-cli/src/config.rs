//! TOML pipeline configuration.
//!
//! Every section is optional; absent keys keep their defaults and command
//! line flags are applied on top.
//!
//! ```toml
//! [raw]
//! skip_rows = 6
//! skip_footer = 7
//!
//! [reshape]
//! entity_column = "Agency Name"
//! key_qualifiers = ["State Name"]
//! entity_label = "DISTRICT"
//!
//! [aggregate]
//! scope = "totals"
//! reconcile_from = 2009
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use edstats_ingest::ReadOptions;
use edstats_model::{AggregateOptions, AuditOptions, EdstatsError, ReshapeOptions};

/// Framing of the raw published exports read by `translate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawExportConfig {
    pub skip_rows: usize,
    pub skip_footer: usize,
}

impl Default for RawExportConfig {
    fn default() -> Self {
        let nces = ReadOptions::nces_export();
        Self {
            skip_rows: nces.skip_rows,
            skip_footer: nces.skip_footer,
        }
    }
}

impl RawExportConfig {
    pub fn read_options(self) -> ReadOptions {
        ReadOptions {
            skip_rows: self.skip_rows,
            skip_footer: self.skip_footer,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub raw: RawExportConfig,
    pub reshape: ReshapeOptions,
    pub aggregate: AggregateOptions,
    pub audit: AuditOptions,
}

impl PipelineConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|error| {
            EdstatsError::configuration(format!("invalid pipeline config: {error}")).into()
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("load config {}", path.display()))
    }

    /// Defaults when no file is given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
