//! Band statistics and demographic families of the aggregate table.

use edstats_model::{AggregateScope, Gender, Grade, MetricKey, Race};

/// One of the eight statistics computed per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BandStat {
    PreKindergarten,
    Kindergarten,
    Grade4,
    Grade8,
    Grade12,
    Grades1To8,
    Grades9To12,
    All,
}

impl BandStat {
    /// Output order within a family.
    pub const ORDER: [BandStat; 8] = [
        BandStat::PreKindergarten,
        BandStat::Kindergarten,
        BandStat::Grade4,
        BandStat::Grade8,
        BandStat::Grade12,
        BandStat::Grades1To8,
        BandStat::Grades9To12,
        BandStat::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PreKindergarten => "PK",
            Self::Kindergarten => "KG",
            Self::Grade4 => "4",
            Self::Grade8 => "8",
            Self::Grade12 => "12",
            Self::Grades1To8 => "1_8",
            Self::Grades9To12 => "9_12",
            Self::All => "ALL",
        }
    }

    /// Grade copied directly, for the five single-grade statistics.
    pub fn direct_grade(self) -> Option<Grade> {
        match self {
            Self::PreKindergarten => Some(Grade::PreKindergarten),
            Self::Kindergarten => Some(Grade::Kindergarten),
            Self::Grade4 => Some(Grade::Level(4)),
            Self::Grade8 => Some(Grade::Level(8)),
            Self::Grade12 => Some(Grade::Level(12)),
            _ => None,
        }
    }

    /// Grades summed, for the two band statistics.
    pub fn band_grades(self) -> Option<Vec<Grade>> {
        match self {
            Self::Grades1To8 => Some((1..=8).map(Grade::Level).collect()),
            Self::Grades9To12 => Some((9..=12).map(Grade::Level).collect()),
            _ => None,
        }
    }
}

/// Demographic slice selecting source columns by race and gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// All students, suffix `G`.
    Total,
    /// One race, suffix e.g. `AM`.
    Race(Race),
    /// One race and gender, suffix e.g. `AMF`.
    RaceGender(Race, Gender),
}

impl Family {
    pub fn suffix(self) -> String {
        match self {
            Self::Total => "G".to_string(),
            Self::Race(race) => race.token().to_string(),
            Self::RaceGender(race, gender) => format!("{}{}", race.token(), gender.token()),
        }
    }

    pub fn metric(self, grade: Grade) -> MetricKey {
        match self {
            Self::Total => MetricKey::new(grade, Race::All, Gender::All),
            Self::Race(race) => MetricKey::new(grade, race, Gender::All),
            Self::RaceGender(race, gender) => MetricKey::new(grade, race, gender),
        }
    }

    /// Output column name, e.g. `GRADES_1_8_G` or `GRADES_ALL_AMF`.
    pub fn column(self, stat: BandStat) -> String {
        format!("GRADES_{}_{}", stat.label(), self.suffix())
    }
}

/// Families in output order: totals, races, then race by gender.
pub fn families(scope: AggregateScope) -> Vec<Family> {
    let mut out = vec![Family::Total];
    if scope == AggregateScope::Extended {
        out.extend(Race::SUBGROUPS.iter().map(|race| Family::Race(*race)));
        for race in Race::SUBGROUPS {
            for gender in Gender::SPLITS {
                out.push(Family::RaceGender(race, gender));
            }
        }
    }
    out
}
