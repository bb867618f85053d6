use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

const ASIA_TAGS: [&str; 2] = ["KR", "JP"];
const EUROPE_TAGS: [&str; 4] = ["EUNE", "EUW", "TR", "RU"];

/// Groups a regional shard code into its continental routing value.
///
/// Matching is a case-insensitive substring test against fixed membership
/// lists, so both `EUW` and `euw1` land in Europe. Anything unknown routes
/// to America.
pub fn classify_region(region: &str) -> Continent {
    let region = region.to_uppercase();

    if ASIA_TAGS.iter().any(|tag| region.contains(tag)) {
        Continent::Asia
    } else if EUROPE_TAGS.iter().any(|tag| region.contains(tag)) {
        Continent::Europe
    } else {
        Continent::America
    }
}

/// Platform routing values (summoner and league endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    BR1,
    LA1,
    LA2,
    NA1,
    JP1,
    KR,
    EUN1,
    EUW1,
    RU,
    TR1,
    OC1,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BR1 => "br1",
            Self::LA1 => "la1",
            Self::LA2 => "la2",
            Self::NA1 => "na1",
            Self::JP1 => "jp1",
            Self::KR => "kr",
            Self::EUN1 => "eun1",
            Self::EUW1 => "euw1",
            Self::RU => "ru",
            Self::TR1 => "tr1",
            Self::OC1 => "oc1",
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BR" | "BR1" => Ok(Self::BR1),
            "LAN" | "LA1" => Ok(Self::LA1),
            "LAS" | "LA2" => Ok(Self::LA2),
            "NA" | "NA1" => Ok(Self::NA1),
            "JP" | "JP1" => Ok(Self::JP1),
            "KR" => Ok(Self::KR),
            "EUNE" | "EUN" | "EUN1" => Ok(Self::EUN1),
            "EUW" | "EUW1" => Ok(Self::EUW1),
            "RU" => Ok(Self::RU),
            "TR" | "TR1" => Ok(Self::TR1),
            "OCE" | "OC" | "OC1" => Ok(Self::OC1),
            _ => Err(AppError::InvalidRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Continental routing values (match endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    Europe,
    Asia,
    America,
}

impl Continent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Europe => "europe",
            Self::Asia => "asia",
            Self::America => "america",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
