//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "edstats",
    version,
    about = "Normalize column-coded education statistics into keyed long tables",
    long_about = "Normalize column-coded education statistics.\n\n\
                  Translates published exports into compound column names, reshapes wide\n\
                  tables into one row per entity and year, builds grade-band aggregates,\n\
                  and audits the results for nulls."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML pipeline configuration. Flags override its values.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Translate raw published exports into compound-coded column names.
    Translate(TranslateArgs),

    /// Reshape a wide table into one row per entity and year.
    Reshape(ReshapeArgs),

    /// Compute grade-band aggregates from a long table.
    Aggregate(AggregateArgs),

    /// Select the reported totals of a long table under aggregate names.
    Summarize(SummarizeArgs),

    /// Outer-join long tables on their keys.
    Merge(MergeArgs),

    /// Write descriptive statistics and null counts of a table as JSON.
    Audit(AuditArgs),
}

#[derive(Args)]
pub struct OutputArg {
    /// Output file.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Raw exports covering the same entities, joined by row position.
    #[arg(value_name = "RAW_CSV", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArg,

    /// Banner lines above the header row.
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,

    /// Note lines below the data.
    #[arg(long = "skip-footer", value_name = "N")]
    pub skip_footer: Option<usize>,
}

#[derive(Args)]
pub struct ReshapeArgs {
    #[arg(value_name = "WIDE_CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArg,

    /// Start from the state or district table settings.
    #[arg(long = "preset", value_enum)]
    pub preset: Option<PresetArg>,

    /// Column holding the entity name.
    #[arg(long = "entity-column", value_name = "COLUMN")]
    pub entity_column: Option<String>,

    /// Name of the entity column in the output.
    #[arg(long = "entity-label", value_name = "LABEL")]
    pub entity_label: Option<String>,

    /// Per-row year column, for tables whose metric names carry no year.
    #[arg(long = "year-column", value_name = "COLUMN")]
    pub year_column: Option<String>,

    /// Column appended to the entity key (repeatable).
    #[arg(long = "qualifier", value_name = "COLUMN")]
    pub qualifiers: Vec<String>,

    /// Join words of entity names with `_` instead of a space.
    #[arg(long = "underscore-keys")]
    pub underscore_keys: bool,

    #[command(flatten)]
    pub sentinels: SentinelArgs,
}

#[derive(Args)]
pub struct AggregateArgs {
    #[arg(value_name = "LONG_CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArg,

    #[arg(long = "scope", value_enum)]
    pub scope: Option<ScopeArg>,

    /// First year whose missing race totals are rebuilt from gender splits.
    #[arg(long = "reconcile-from", value_name = "YEAR", conflicts_with = "reconcile_all")]
    pub reconcile_from: Option<u16>,

    /// Rebuild missing race totals for every year.
    #[arg(long = "reconcile-all")]
    pub reconcile_all: bool,

    #[command(flatten)]
    pub sentinels: SentinelArgs,
}

#[derive(Args)]
pub struct SummarizeArgs {
    #[arg(value_name = "LONG_CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArg,

    #[command(flatten)]
    pub sentinels: SentinelArgs,
}

#[derive(Args)]
pub struct MergeArgs {
    #[arg(value_name = "LONG_CSV", num_args = 2.., required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArg,
}

#[derive(Args)]
pub struct AuditArgs {
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArg,

    /// Column to group null counts by.
    #[arg(long = "year-label", value_name = "COLUMN", conflicts_with = "no_year_grouping")]
    pub year_label: Option<String>,

    /// Skip the null counts by year.
    #[arg(long = "no-year-grouping")]
    pub no_year_grouping: bool,

    /// Column whose values must be unique.
    #[arg(long = "key-column", value_name = "COLUMN")]
    pub key_column: Option<String>,
}

#[derive(Args)]
pub struct SentinelArgs {
    /// Also treat the em-dash as not reported (achievement tables).
    #[arg(long = "achievement")]
    pub achievement: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    States,
    Districts,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// Only the all-students family.
    Totals,
    /// Totals, races, and race by gender.
    Extended,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
