//! Library side of the `edstats` binary: configuration, logging, and the
//! file-to-file stage runners.

pub mod config;
pub mod hash;
pub mod logging;
pub mod pipeline;
pub mod types;
