use edstats_core::ColumnCodec;
use edstats_model::{ColumnSpec, Gender, Grade, MetricKey, Race, SurveyYear};
use proptest::prelude::*;

fn grade() -> impl Strategy<Value = Grade> {
    prop_oneof![
        Just(Grade::PreKindergarten),
        Just(Grade::Kindergarten),
        (1u8..=13).prop_map(Grade::Level),
        Just(Grade::Ungraded),
        Just(Grade::AdultEducation),
        Just(Grade::AllGrades),
        Just(Grade::Band1To8),
        Just(Grade::Band9To12),
        Just(Grade::All),
    ]
}

fn race() -> impl Strategy<Value = Race> {
    prop_oneof![
        Just(Race::AmericanIndian),
        Just(Race::Asian),
        Just(Race::Hispanic),
        Just(Race::Black),
        Just(Race::White),
        Just(Race::PacificIslander),
        Just(Race::TwoOrMore),
        Just(Race::All),
    ]
}

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female), Just(Gender::All)]
}

fn metric() -> impl Strategy<Value = MetricKey> {
    (grade(), race(), gender()).prop_map(|(g, r, s)| MetricKey::new(g, r, s))
}

proptest! {
    #[test]
    fn encode_then_decode_restores_spec(
        metric in metric(),
        year in proptest::option::of(1990u16..=2030),
    ) {
        let codec = ColumnCodec::default();
        let spec = ColumnSpec { year: year.map(SurveyYear::new), metric };
        let name = codec.encode_spec(&spec);
        let decoded = codec.decode(&name).expect("canonical names decode");
        prop_assert_eq!(decoded, spec);
    }

    #[test]
    fn decode_then_encode_is_canonical(metric in metric(), year in 1990u16..=2030) {
        let codec = ColumnCodec::default();
        let canonical = metric.column_name();
        let swapped = format!("{year}_{}_{}_{}", metric.race, metric.grade, metric.gender);
        for name in [format!("{year}_{canonical}"), swapped] {
            let spec = codec.decode(&name).expect("decode");
            prop_assert_eq!(spec.year, Some(SurveyYear::new(year)));
            prop_assert_eq!(codec.encode(&spec.metric), canonical.clone());
        }
    }

    #[test]
    fn arbitrary_text_never_panics(name in "[A-Z0-9_ -]{0,24}") {
        let _ = ColumnCodec::default().decode(&name);
    }
}
