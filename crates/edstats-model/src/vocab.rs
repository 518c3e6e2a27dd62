//! Closed token vocabularies for grade, race and gender.
//!
//! Published enrollment tables encode each metric column with short tokens.
//! The vocabularies are fixed: a token outside them makes the whole column
//! name malformed. `A` is the "all categories" token in every slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token used for "all categories" in every slot.
pub const ALL_TOKEN: &str = "A";

/// Grade level or reported grade band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// `PK`
    PreKindergarten,
    /// `KG`
    Kindergarten,
    /// `G01` through `G13`.
    Level(u8),
    /// `UG`
    Ungraded,
    /// `AE`
    AdultEducation,
    /// `AL`
    AllGrades,
    /// `G01-G08`, the reported elementary band total.
    Band1To8,
    /// `G09-G12`, the reported secondary band total.
    Band9To12,
    /// `A`
    All,
}

impl Grade {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PK" => Some(Self::PreKindergarten),
            "KG" => Some(Self::Kindergarten),
            "UG" => Some(Self::Ungraded),
            "AE" => Some(Self::AdultEducation),
            "AL" => Some(Self::AllGrades),
            "G01-G08" => Some(Self::Band1To8),
            "G09-G12" => Some(Self::Band9To12),
            ALL_TOKEN => Some(Self::All),
            other => parse_level(other).map(Self::Level),
        }
    }

    pub fn token(self) -> String {
        match self {
            Self::PreKindergarten => "PK".to_string(),
            Self::Kindergarten => "KG".to_string(),
            Self::Level(level) => format!("G{level:02}"),
            Self::Ungraded => "UG".to_string(),
            Self::AdultEducation => "AE".to_string(),
            Self::AllGrades => "AL".to_string(),
            Self::Band1To8 => "G01-G08".to_string(),
            Self::Band9To12 => "G09-G12".to_string(),
            Self::All => ALL_TOKEN.to_string(),
        }
    }
}

fn parse_level(token: &str) -> Option<u8> {
    let digits = token.strip_prefix('G')?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let level: u8 = digits.parse().ok()?;
    (1..=13).contains(&level).then_some(level)
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Race/ethnicity subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Race {
    AmericanIndian,
    Asian,
    Hispanic,
    Black,
    White,
    PacificIslander,
    TwoOrMore,
    All,
}

impl Race {
    /// The seven specific subgroups in reporting order.
    pub const SUBGROUPS: [Race; 7] = [
        Race::AmericanIndian,
        Race::Asian,
        Race::Hispanic,
        Race::Black,
        Race::White,
        Race::PacificIslander,
        Race::TwoOrMore,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "AM" => Some(Self::AmericanIndian),
            "AS" => Some(Self::Asian),
            "HI" => Some(Self::Hispanic),
            "BL" => Some(Self::Black),
            "WH" => Some(Self::White),
            "HP" => Some(Self::PacificIslander),
            "TR" => Some(Self::TwoOrMore),
            ALL_TOKEN => Some(Self::All),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::AmericanIndian => "AM",
            Self::Asian => "AS",
            Self::Hispanic => "HI",
            Self::Black => "BL",
            Self::White => "WH",
            Self::PacificIslander => "HP",
            Self::TwoOrMore => "TR",
            Self::All => ALL_TOKEN,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    All,
}

impl Gender {
    /// Gender splits in reporting order.
    pub const SPLITS: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            ALL_TOKEN => Some(Self::All),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::All => ALL_TOKEN,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
