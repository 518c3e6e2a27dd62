use edstats_core::{LongFrame, reshape_wide};
use edstats_ingest::CsvTable;
use edstats_model::{AggregateOptions, IssueKind, ReshapeOptions, SentinelSet, SurveyYear};
use edstats_transform::{aggregate, summarize_reported};
use proptest::prelude::*;

fn long(years: &[i32], columns: Vec<(&str, Vec<Option<f64>>)>) -> LongFrame {
    let entities: Vec<String> = years.iter().map(|_| "IDAHO".to_string()).collect();
    let keys: Vec<String> = years.iter().map(|year| format!("{year}_IDAHO")).collect();
    LongFrame::from_parts(
        "STATE",
        keys,
        entities,
        years.iter().map(|year| Some(*year)).collect(),
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect(),
    )
    .expect("frame")
}

fn column(frame: &LongFrame, name: &str) -> Vec<Option<f64>> {
    frame
        .metric_values(name)
        .expect("values")
        .unwrap_or_else(|| panic!("missing column {name}"))
}

fn grade_columns(race: &str, gender: &str, values: [f64; 12]) -> Vec<(String, Vec<Option<f64>>)> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| (format!("G{:02}_{race}_{gender}", idx + 1), vec![Some(*value)]))
        .collect()
}

#[test]
fn reconciles_race_from_gender_split() {
    let frame = long(
        &[2009],
        vec![("PK_AM_M", vec![Some(10.0)]), ("PK_AM_F", vec![Some(8.0)])],
    );
    let outcome = aggregate(&frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(column(&outcome.frame, "GRADES_PK_AM"), vec![Some(18.0)]);
    assert_eq!(column(&outcome.frame, "GRADES_PK_AMM"), vec![Some(10.0)]);
    assert_eq!(column(&outcome.frame, "GRADES_PK_AMF"), vec![Some(8.0)]);
    assert_eq!(outcome.reconciled, 1);
}

#[test]
fn reshaped_gender_split_fills_race_total() {
    let wide = CsvTable::new(
        vec![
            "Agency Name".to_string(),
            "2009_AM_PK_M".to_string(),
            "2009_AM_PK_F".to_string(),
        ],
        vec![vec!["Nampa".to_string(), "10".to_string(), "8".to_string()]],
    );
    let long = reshape_wide(&wide, &ReshapeOptions::default()).expect("reshape");
    let outcome = aggregate(&long.frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(
        outcome.frame.primary_keys().unwrap(),
        vec!["2009_NAMPA".to_string()]
    );
    assert_eq!(column(&outcome.frame, "GRADES_PK_AM"), vec![Some(18.0)]);
}

#[test]
fn reconciliation_waits_for_boundary_year() {
    let frame = long(
        &[2008, 2009],
        vec![
            ("PK_AM_M", vec![Some(10.0), Some(10.0)]),
            ("PK_AM_F", vec![Some(8.0), Some(8.0)]),
        ],
    );
    let outcome = aggregate(&frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(column(&outcome.frame, "GRADES_PK_AM"), vec![None, Some(18.0)]);

    let all_years = AggregateOptions::default().reconcile_all_years();
    let outcome = aggregate(&frame, &all_years).expect("aggregate");
    assert_eq!(
        column(&outcome.frame, "GRADES_PK_AM"),
        vec![Some(18.0), Some(18.0)]
    );
}

#[test]
fn reconciliation_never_overwrites_present_values() {
    let frame = long(
        &[2010],
        vec![
            ("PK_AM_A", vec![Some(20.0)]),
            ("PK_AM_M", vec![Some(10.0)]),
            ("PK_AM_F", vec![Some(8.0)]),
        ],
    );
    let outcome = aggregate(&frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(column(&outcome.frame, "GRADES_PK_AM"), vec![Some(20.0)]);
    assert_eq!(outcome.reconciled, 0);
    assert_eq!(outcome.report.total(IssueKind::AmbiguousAggregateInput), 1);
}

#[test]
fn disagreement_before_boundary_is_still_reported() {
    let frame = long(
        &[2005, 2010],
        vec![
            ("PK_AM_A", vec![Some(30.0), None]),
            ("PK_AM_M", vec![Some(10.0), Some(10.0)]),
            ("PK_AM_F", vec![Some(8.0), Some(8.0)]),
        ],
    );
    let outcome = aggregate(&frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(
        column(&outcome.frame, "GRADES_PK_AM"),
        vec![Some(30.0), Some(18.0)]
    );
    assert_eq!(outcome.reconciled, 1);
    assert_eq!(outcome.report.total(IssueKind::AmbiguousAggregateInput), 1);
    let issue = &outcome.report.issues[0];
    assert_eq!(issue.column.as_deref(), Some("GRADES_PK_AM"));
}

#[test]
fn one_sided_split_stays_missing() {
    let frame = long(&[2012], vec![("PK_HI_M", vec![Some(4.0)])]);
    let outcome = aggregate(&frame, &AggregateOptions::default()).expect("aggregate");
    assert_eq!(column(&outcome.frame, "GRADES_PK_HI"), vec![None]);
    assert_eq!(outcome.reconciled, 0);
}

#[test]
fn computes_total_bands() {
    let mut columns = grade_columns(
        "A",
        "A",
        [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
    );
    columns.push(("PK_A_A".to_string(), vec![Some(100.0)]));
    columns.push(("KG_A_A".to_string(), vec![Some(50.0)]));
    let frame = long(
        &[2015],
        columns.iter().map(|(n, v)| (n.as_str(), v.clone())).collect(),
    );
    let outcome = aggregate(&frame, &AggregateOptions::totals()).expect("aggregate");
    let out = &outcome.frame;
    assert_eq!(column(out, "GRADES_PK_G"), vec![Some(100.0)]);
    assert_eq!(column(out, "GRADES_KG_G"), vec![Some(50.0)]);
    assert_eq!(column(out, "GRADES_4_G"), vec![Some(4.0)]);
    assert_eq!(column(out, "GRADES_8_G"), vec![Some(8.0)]);
    assert_eq!(column(out, "GRADES_12_G"), vec![Some(12.0)]);
    assert_eq!(column(out, "GRADES_1_8_G"), vec![Some(36.0)]);
    assert_eq!(column(out, "GRADES_9_12_G"), vec![Some(42.0)]);
    assert_eq!(column(out, "GRADES_ALL_G"), vec![Some(178.0)]);
}

#[test]
fn missing_operand_propagates() {
    let mut columns = grade_columns(
        "A",
        "A",
        [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
    );
    columns[4].1 = vec![Some(-1.0)];
    columns.push(("PK_A_A".to_string(), vec![Some(100.0)]));
    let frame = long(
        &[2015],
        columns.iter().map(|(n, v)| (n.as_str(), v.clone())).collect(),
    );
    let outcome = aggregate(&frame, &AggregateOptions::totals()).expect("aggregate");
    assert_eq!(column(&outcome.frame, "GRADES_1_8_G"), vec![None]);
    assert_eq!(column(&outcome.frame, "GRADES_9_12_G"), vec![Some(42.0)]);
    assert_eq!(column(&outcome.frame, "GRADES_ALL_G"), vec![None]);
    assert_eq!(column(&outcome.frame, "GRADES_KG_G"), vec![None]);
}

#[test]
fn output_columns_follow_family_order() {
    let frame = long(&[2015], vec![("A_A_A", vec![Some(1.0)])]);
    let totals = aggregate(&frame, &AggregateOptions::totals()).expect("totals");
    assert_eq!(
        totals.frame.metric_names(),
        vec![
            "GRADES_PK_G",
            "GRADES_KG_G",
            "GRADES_4_G",
            "GRADES_8_G",
            "GRADES_12_G",
            "GRADES_1_8_G",
            "GRADES_9_12_G",
            "GRADES_ALL_G",
        ]
    );
    let extended = aggregate(&frame, &AggregateOptions::default()).expect("extended");
    let names = extended.frame.metric_names();
    assert_eq!(names.len(), 22 * 8);
    assert_eq!(names[8], "GRADES_PK_AM");
    assert_eq!(names[8 * 7 + 7], "GRADES_ALL_TR");
    assert_eq!(names[8 * 8], "GRADES_PK_AMM");
    assert_eq!(names[8 * 9], "GRADES_PK_AMF");
    assert_eq!(names[names.len() - 1], "GRADES_ALL_TRF");
    assert!(!extended.absent_sources.is_empty());
}

#[test]
fn rows_sorted_by_primary_key() {
    let frame = LongFrame::from_parts(
        "STATE",
        vec!["2017_UTAH".to_string(), "2017_IDAHO".to_string()],
        vec!["UTAH".to_string(), "IDAHO".to_string()],
        vec![Some(2017), Some(2017)],
        vec![("PK_A_A".to_string(), vec![Some(2.0), Some(1.0)])],
    )
    .expect("frame");
    let outcome = aggregate(&frame, &AggregateOptions::totals()).expect("aggregate");
    assert_eq!(
        outcome.frame.primary_keys().unwrap(),
        vec!["2017_IDAHO", "2017_UTAH"]
    );
    assert_eq!(outcome.frame.entities().unwrap(), vec!["IDAHO", "UTAH"]);
    assert_eq!(
        outcome.frame.years().unwrap(),
        vec![Some(SurveyYear::new(2017)), Some(SurveyYear::new(2017))]
    );
    assert_eq!(column(&outcome.frame, "GRADES_PK_G"), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn selects_reported_summary() {
    let frame = long(
        &[2016],
        vec![
            ("A_A_A", vec![Some(15585.0)]),
            ("G01-G08_A_A", vec![Some(9000.0)]),
            ("PK_A_A", vec![Some(-2.0)]),
            ("G03_A_A", vec![Some(1.0)]),
        ],
    );
    let summary = summarize_reported(&frame, &SentinelSet::nces()).expect("summary");
    assert_eq!(summary.metric_names().len(), 8);
    assert_eq!(column(&summary, "GRADES_ALL_G"), vec![Some(15585.0)]);
    assert_eq!(column(&summary, "GRADES_1_8_G"), vec![Some(9000.0)]);
    assert_eq!(column(&summary, "GRADES_PK_G"), vec![None]);
    assert_eq!(column(&summary, "GRADES_9_12_G"), vec![None]);
}

proptest! {
    #[test]
    fn all_grades_equals_its_bands(
        pk in 0u32..100_000,
        grades in proptest::array::uniform12(0u32..100_000),
    ) {
        let mut columns: Vec<(String, Vec<Option<f64>>)> = grades
            .iter()
            .enumerate()
            .map(|(idx, v)| (format!("G{:02}_A_A", idx + 1), vec![Some(f64::from(*v))]))
            .collect();
        columns.push(("PK_A_A".to_string(), vec![Some(f64::from(pk))]));
        let frame = long(
            &[2015],
            columns.iter().map(|(n, v)| (n.as_str(), v.clone())).collect(),
        );
        let out = aggregate(&frame, &AggregateOptions::totals()).expect("aggregate").frame;
        let all = column(&out, "GRADES_ALL_G")[0].expect("present");
        let pk = column(&out, "GRADES_PK_G")[0].expect("present");
        let lower = column(&out, "GRADES_1_8_G")[0].expect("present");
        let upper = column(&out, "GRADES_9_12_G")[0].expect("present");
        prop_assert_eq!(all, pk + lower + upper);
    }

    #[test]
    fn reconciled_race_total_equals_split_sum(
        male in 0u32..50_000,
        female in 0u32..50_000,
        year in 2009i32..2030,
    ) {
        let mut columns = Vec::new();
        for (gender, value) in [("M", male), ("F", female)] {
            columns.push((format!("PK_WH_{gender}"), vec![Some(f64::from(value))]));
            for level in 1..=12 {
                columns.push((format!("G{level:02}_WH_{gender}"), vec![Some(f64::from(value))]));
            }
        }
        let frame = long(
            &[year],
            columns.iter().map(|(n, v)| (n.as_str(), v.clone())).collect(),
        );
        let out = aggregate(&frame, &AggregateOptions::default()).expect("aggregate").frame;
        let total = column(&out, "GRADES_ALL_WH")[0].expect("reconciled");
        let split_m = column(&out, "GRADES_ALL_WHM")[0].expect("male");
        let split_f = column(&out, "GRADES_ALL_WHF")[0].expect("female");
        prop_assert_eq!(total, split_m + split_f);
    }
}
