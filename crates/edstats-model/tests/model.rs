use edstats_model::{
    AggregateOptions, AggregateScope, CellValue, EdstatsError, Gender, Grade, IssueKind,
    KeyStyle, MetricKey, Race, ReshapeOptions, SentinelSet, SurveyYear,
};

#[test]
fn grade_tokens_cover_levels_and_bands() {
    assert_eq!(Grade::from_token("G01"), Some(Grade::Level(1)));
    assert_eq!(Grade::from_token("G13"), Some(Grade::Level(13)));
    assert_eq!(Grade::from_token("G14"), None);
    assert_eq!(Grade::from_token("G00"), None);
    assert_eq!(Grade::from_token("G1"), None);
    assert_eq!(Grade::from_token("G01-G08"), Some(Grade::Band1To8));
    assert_eq!(Grade::from_token("A"), Some(Grade::All));
    assert_eq!(Grade::Level(4).token(), "G04");
    assert_eq!(Grade::Band9To12.to_string(), "G09-G12");
}

#[test]
fn race_and_gender_tokens() {
    for race in Race::SUBGROUPS {
        assert_eq!(Race::from_token(race.token()), Some(race));
    }
    assert_eq!(Race::from_token("XX"), None);
    assert_eq!(Gender::from_token("F"), Some(Gender::Female));
    assert_eq!(Gender::from_token("f"), None);
}

#[test]
fn metric_key_column_name() {
    let key = MetricKey::new(Grade::PreKindergarten, Race::AmericanIndian, Gender::Male);
    assert_eq!(key.column_name(), "PK_AM_M");
    let total = MetricKey::new(Grade::All, Race::All, Gender::All);
    assert_eq!(total.to_string(), "A_A_A");
}

#[test]
fn survey_year_requires_four_digits() {
    assert_eq!(SurveyYear::parse("2017"), Some(SurveyYear::new(2017)));
    assert_eq!(SurveyYear::parse("17"), None);
    assert_eq!(SurveyYear::parse("Y?"), None);
    assert_eq!(SurveyYear::parse("20170"), None);
}

#[test]
fn sentinels_become_missing() {
    let set = SentinelSet::nces();
    assert_eq!(set.coerce("15585"), CellValue::Number(15585.0));
    assert_eq!(set.coerce(" 12.5 "), CellValue::Number(12.5));
    assert_eq!(set.coerce("-1"), CellValue::Sentinel);
    assert_eq!(set.coerce("-2.0"), CellValue::Sentinel);
    assert_eq!(set.coerce("M"), CellValue::Sentinel);
    assert_eq!(set.coerce(""), CellValue::Missing);
    assert_eq!(set.coerce("n/a"), CellValue::Unparseable);
    assert_eq!(set.coerce("\u{2014}"), CellValue::Unparseable);
    assert_eq!(SentinelSet::achievement().coerce("\u{2014}"), CellValue::Sentinel);
    assert_eq!(set.mask(Some(-1.0)), None);
    assert_eq!(set.mask(Some(-3.0)), Some(-3.0));
}

#[test]
fn reshape_presets() {
    let states = ReshapeOptions::states();
    assert_eq!(states.entity_column, "State Name");
    assert_eq!(states.key_style, KeyStyle::Underscored);
    let districts = ReshapeOptions::districts();
    assert_eq!(districts.key_qualifiers, vec!["State Name".to_string()]);
}

#[test]
fn options_deserialize_from_toml() {
    let reshape: ReshapeOptions = toml::from_str(
        r#"
        entity_column = "Agency Name"
        entity_label = "DISTRICT"
        key_style = "underscored"

        [sentinels]
        codes = [-9.0]
        tokens = ["N/A"]
        "#,
    )
    .expect("parse reshape options");
    assert_eq!(reshape.entity_label, "DISTRICT");
    assert_eq!(reshape.delimiter, '_');
    assert!(reshape.sentinels.is_sentinel_token("N/A"));
    assert!(!reshape.sentinels.is_sentinel_code(-1.0));

    let aggregate: AggregateOptions =
        toml::from_str("scope = \"totals\"\nreconcile_from = 2010\n").expect("parse");
    assert_eq!(aggregate.scope, AggregateScope::Totals);
    assert_eq!(aggregate.reconcile_from, Some(SurveyYear::new(2010)));
}

#[test]
fn reconcile_window() {
    let options = AggregateOptions::default();
    assert!(!options.reconciles(Some(SurveyYear::new(2008))));
    assert!(options.reconciles(Some(SurveyYear::new(2009))));
    assert!(!options.reconciles(None));
    assert!(options.reconcile_all_years().reconciles(None));
}

#[test]
fn recorded_errors_map_to_issue_kinds() {
    let error = EdstatsError::MalformedColumnSpec {
        column: "2017_A_A".to_string(),
        reason: "3 tokens".to_string(),
    };
    assert_eq!(error.issue_kind(), Some(IssueKind::MalformedColumnSpec));
    assert!(error.to_string().contains("2017_A_A"));
    assert_eq!(EdstatsError::configuration("x").issue_kind(), None);
}

#[test]
fn preset_overrides_through_builders() {
    let options = ReshapeOptions::districts()
        .with_entity_label("AGENCY")
        .with_year_column("SCHOOL_YEAR")
        .with_sentinels(SentinelSet::achievement());
    assert_eq!(options.entity_column, "Agency Name");
    assert_eq!(options.key_qualifiers, vec!["State Name"]);
    assert_eq!(options.entity_label, "AGENCY");
    assert_eq!(options.year_column.as_deref(), Some("SCHOOL_YEAR"));
    assert!(options.sentinels.is_sentinel_token("\u{2014}"));
    assert!(!ReshapeOptions::districts().sentinels.is_sentinel_token("\u{2014}"));
}
