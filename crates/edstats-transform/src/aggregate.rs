//! Two-pass aggregation of long tables into grade-band summaries.
//!
//! The first pass computes every family from its own source columns with
//! missing operands propagating. The second pass fills missing per-race
//! statistics from their male and female splits for years at or after the
//! reconciliation boundary. It never overwrites a present value. A present
//! value that disagrees with its split is kept and reported in any year.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use edstats_core::LongFrame;
use edstats_model::{
    AggregateOptions, DataIssue, EdstatsError, Gender, Grade, IssueKind, QualityReport, Race,
    SurveyYear,
};
use tracing::{debug, info, info_span, warn};

use crate::bands::{BandStat, Family, families};

type Values = Vec<Option<f64>>;

/// Result of [`aggregate`].
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub frame: LongFrame,
    pub report: QualityReport,
    /// Cells filled by the reconciliation pass.
    pub reconciled: usize,
    /// Source columns not present in the input.
    pub absent_sources: Vec<String>,
}

/// Sentinel-masked source columns, absent ones as all-missing.
struct SourceColumns {
    height: usize,
    columns: BTreeMap<String, Values>,
    absent: BTreeSet<String>,
}

impl SourceColumns {
    fn load(frame: &LongFrame, options: &AggregateOptions, names: &BTreeSet<String>) -> Result<Self> {
        let height = frame.record_count();
        let mut columns = BTreeMap::new();
        let mut absent = BTreeSet::new();
        for name in names {
            match frame.metric_values(name)? {
                Some(values) => {
                    let masked = values.into_iter().map(|v| options.sentinels.mask(v)).collect();
                    columns.insert(name.clone(), masked);
                }
                None => {
                    debug!(column = %name, "source column absent, treated as missing");
                    absent.insert(name.clone());
                }
            }
        }
        Ok(Self {
            height,
            columns,
            absent,
        })
    }

    fn get(&self, family: Family, grade: Grade) -> Option<&Values> {
        self.columns.get(&family.metric(grade).column_name())
    }

    fn direct(&self, family: Family, grade: Grade) -> Values {
        self.get(family, grade)
            .cloned()
            .unwrap_or_else(|| vec![None; self.height])
    }

    fn band(&self, family: Family, grades: &[Grade]) -> Values {
        let inputs: Vec<Option<&Values>> = grades.iter().map(|g| self.get(family, *g)).collect();
        (0..self.height)
            .map(|row| {
                inputs.iter().try_fold(0.0, |acc, column| {
                    column.and_then(|values| values[row]).map(|v| acc + v)
                })
            })
            .collect()
    }
}

/// Sum that is missing when any operand is missing.
fn add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? + b?)
}

fn source_names(families: &[Family]) -> BTreeSet<String> {
    let mut grades: Vec<Grade> = BandStat::ORDER
        .iter()
        .filter_map(|stat| stat.direct_grade())
        .collect();
    grades.extend((1..=12).map(Grade::Level));
    let mut names = BTreeSet::new();
    for family in families {
        for grade in &grades {
            names.insert(family.metric(*grade).column_name());
        }
    }
    names
}

/// First pass: the eight statistics of one family, in [`BandStat::ORDER`].
fn family_stats(sources: &SourceColumns, family: Family) -> Vec<Values> {
    let mut stats: BTreeMap<BandStat, Values> = BTreeMap::new();
    for stat in BandStat::ORDER {
        if let Some(grade) = stat.direct_grade() {
            stats.insert(stat, sources.direct(family, grade));
        } else if let Some(grades) = stat.band_grades() {
            stats.insert(stat, sources.band(family, &grades));
        }
    }
    let all: Values = (0..sources.height)
        .map(|row| {
            let pk = stats[&BandStat::PreKindergarten][row];
            let lower = stats[&BandStat::Grades1To8][row];
            let upper = stats[&BandStat::Grades9To12][row];
            add(add(pk, lower), upper)
        })
        .collect();
    stats.insert(BandStat::All, all);
    BandStat::ORDER
        .iter()
        .map(|stat| stats.remove(stat).unwrap_or_default())
        .collect()
}

struct Reconciler<'a> {
    options: &'a AggregateOptions,
    keys: &'a [String],
    years: &'a [Option<SurveyYear>],
    filled: usize,
}

impl Reconciler<'_> {
    /// Second pass for one race and statistic. Disagreements are reported
    /// for every year; only the fill waits for the boundary.
    fn reconcile(
        &mut self,
        column: &str,
        race_values: &mut Values,
        male: &Values,
        female: &Values,
        report: &mut QualityReport,
    ) {
        let mut disagreements = 0u64;
        for row in 0..race_values.len() {
            let split = add(male[row], female[row]);
            match (race_values[row], split) {
                (None, Some(sum)) if self.options.reconciles(self.years[row]) => {
                    race_values[row] = Some(sum);
                    self.filled += 1;
                }
                (Some(reported), Some(sum)) if reported != sum => {
                    if disagreements == 0 {
                        let error = EdstatsError::AmbiguousAggregateInput {
                            column: column.to_string(),
                            primary_key: self.keys[row].clone(),
                            reported,
                            split_sum: sum,
                        };
                        warn!(column, "{error}");
                    }
                    disagreements += 1;
                }
                _ => {}
            }
        }
        if disagreements > 0 {
            report.push(DataIssue::new(
                IssueKind::AmbiguousAggregateInput,
                Some(column),
                format!("{disagreements} row(s) disagree with the gender split; reported value kept"),
                disagreements,
            ));
        }
    }
}

/// Computes the aggregate table for `frame`.
///
/// Output columns are `PRIMARY_KEY`, the entity column, `YEAR`, then
/// `GRADES_{stat}_{suffix}` for each family. Rows are sorted by primary key.
pub fn aggregate(frame: &LongFrame, options: &AggregateOptions) -> Result<AggregateOutcome> {
    let span = info_span!("aggregate", rows = frame.record_count());
    let _guard = span.enter();

    if frame.record_count() == 0 {
        return Err(EdstatsError::EmptyOutput {
            stage: "aggregate".to_string(),
        }
        .into());
    }
    let mut report = QualityReport::new("aggregate");
    let output_families = families(options.scope);
    let sources = SourceColumns::load(frame, options, &source_names(&output_families))?;

    let mut computed: BTreeMap<Family, Vec<Values>> = output_families
        .iter()
        .map(|family| (*family, family_stats(&sources, *family)))
        .collect();

    let keys = frame.primary_keys()?;
    let years = frame.years()?;
    let mut reconciler = Reconciler {
        options,
        keys: &keys,
        years: &years,
        filled: 0,
    };
    for race in Race::SUBGROUPS {
        let male = computed
            .get(&Family::RaceGender(race, Gender::Male))
            .cloned()
            .unwrap_or_default();
        let female = computed
            .get(&Family::RaceGender(race, Gender::Female))
            .cloned()
            .unwrap_or_default();
        let Some(race_stats) = computed.get_mut(&Family::Race(race)) else {
            continue;
        };
        for (idx, stat) in BandStat::ORDER.iter().enumerate() {
            let column = Family::Race(race).column(*stat);
            reconciler.reconcile(
                &column,
                &mut race_stats[idx],
                &male[idx],
                &female[idx],
                &mut report,
            );
        }
    }
    let reconciled = reconciler.filled;

    let mut metrics = Vec::with_capacity(output_families.len() * BandStat::ORDER.len());
    for family in &output_families {
        let stats = computed.remove(family).unwrap_or_default();
        for (stat, values) in BandStat::ORDER.iter().zip(stats) {
            metrics.push((family.column(*stat), values));
        }
    }
    let out = frame.derive(metrics)?;

    let absent_sources: Vec<String> = sources.absent.into_iter().collect();
    info!(
        families = output_families.len(),
        columns = out.metric_names().len(),
        reconciled,
        absent_sources = absent_sources.len(),
        "aggregated long table"
    );
    Ok(AggregateOutcome {
        frame: out,
        report,
        reconciled,
        absent_sources,
    })
}
