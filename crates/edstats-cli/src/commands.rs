//! Subcommand handlers: merge the config file with flags, then run a stage.

use anyhow::Result;

use edstats_cli::config::PipelineConfig;
use edstats_cli::pipeline;
use edstats_cli::types::StageResult;
use edstats_model::{
    AggregateOptions, AggregateScope, AuditOptions, KeyStyle, ReshapeOptions, SentinelSet,
    SurveyYear,
};

use crate::cli::{
    AggregateArgs, AuditArgs, MergeArgs, PresetArg, ReshapeArgs, ScopeArg, SentinelArgs,
    SummarizeArgs, TranslateArgs,
};

fn sentinels(args: &SentinelArgs, configured: &SentinelSet) -> SentinelSet {
    if args.achievement {
        SentinelSet::achievement()
    } else {
        configured.clone()
    }
}

pub fn run_translate(args: &TranslateArgs, config: &PipelineConfig) -> Result<StageResult> {
    let mut read = config.raw.read_options();
    if let Some(rows) = args.skip_rows {
        read.skip_rows = rows;
    }
    if let Some(rows) = args.skip_footer {
        read.skip_footer = rows;
    }
    pipeline::translate(&args.inputs, &args.output.output, read)
}

fn reshape_options(args: &ReshapeArgs, config: &PipelineConfig) -> ReshapeOptions {
    let mut options = match args.preset {
        Some(PresetArg::States) => ReshapeOptions::states(),
        Some(PresetArg::Districts) => ReshapeOptions::districts(),
        None => config.reshape.clone(),
    };
    if let Some(column) = &args.entity_column {
        options.entity_column.clone_from(column);
    }
    if let Some(label) = &args.entity_label {
        options = options.with_entity_label(label.as_str());
    }
    if let Some(column) = &args.year_column {
        options = options.with_year_column(column.as_str());
    }
    if !args.qualifiers.is_empty() {
        options.key_qualifiers.clone_from(&args.qualifiers);
    }
    if args.underscore_keys {
        options.key_style = KeyStyle::Underscored;
    }
    let sentinels = sentinels(&args.sentinels, &options.sentinels);
    options.with_sentinels(sentinels)
}

pub fn run_reshape(args: &ReshapeArgs, config: &PipelineConfig) -> Result<StageResult> {
    let options = reshape_options(args, config);
    pipeline::reshape(&args.input, &args.output.output, &options)
}

fn aggregate_options(args: &AggregateArgs, config: &PipelineConfig) -> AggregateOptions {
    let mut options = config.aggregate.clone();
    if let Some(scope) = args.scope {
        options.scope = match scope {
            ScopeArg::Totals => AggregateScope::Totals,
            ScopeArg::Extended => AggregateScope::Extended,
        };
    }
    if let Some(year) = args.reconcile_from {
        options.reconcile_from = Some(SurveyYear::new(year));
    }
    if args.reconcile_all {
        options.reconcile_from = None;
    }
    options.sentinels = sentinels(&args.sentinels, &options.sentinels);
    options
}

pub fn run_aggregate(args: &AggregateArgs, config: &PipelineConfig) -> Result<StageResult> {
    let options = aggregate_options(args, config);
    pipeline::aggregate(&args.input, &args.output.output, &options)
}

pub fn run_summarize(args: &SummarizeArgs, config: &PipelineConfig) -> Result<StageResult> {
    let sentinels = sentinels(&args.sentinels, &config.aggregate.sentinels);
    pipeline::summarize(&args.input, &args.output.output, &sentinels)
}

pub fn run_merge(args: &MergeArgs, config: &PipelineConfig) -> Result<StageResult> {
    pipeline::merge(&args.inputs, &args.output.output, &config.aggregate.sentinels)
}

pub fn run_audit(args: &AuditArgs, config: &PipelineConfig) -> Result<StageResult> {
    let mut options: AuditOptions = config.audit.clone();
    if let Some(label) = &args.year_label {
        options.year_label = Some(label.clone());
    }
    if args.no_year_grouping {
        options.year_label = None;
    }
    if let Some(column) = &args.key_column {
        options.key_column = Some(column.clone());
    }
    pipeline::audit(
        &args.input,
        &args.output.output,
        &options,
        &config.aggregate.sentinels,
    )
}
