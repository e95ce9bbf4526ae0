//! Storage locations: the intake area, the floor, and the aisle/level bins.
//!
//! A location is a key, never a stored entity. Only the 16 keys produced by
//! [`Location::all`] exist; anything else fails to parse.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use voilerie_core::DomainError;

/// Storage aisle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Aisle {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Aisle {
    pub const ALL: [Aisle; 7] = [
        Aisle::A,
        Aisle::B,
        Aisle::C,
        Aisle::D,
        Aisle::E,
        Aisle::F,
        Aisle::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aisle::A => "A",
            Aisle::B => "B",
            Aisle::C => "C",
            Aisle::D => "D",
            Aisle::E => "E",
            Aisle::F => "F",
            Aisle::G => "G",
        }
    }
}

impl FromStr for Aisle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aisle::ALL
            .into_iter()
            .find(|aisle| aisle.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown aisle `{s}`")))
    }
}

/// Shelf level within an aisle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Haut,
    Bas,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::Haut, Level::Bas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Haut => "Haut",
            Level::Bas => "Bas",
        }
    }
}

impl FromStr for Level {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown level `{s}`")))
    }
}

/// Where a sail currently sits.
///
/// Variant order drives the derived `Ord`, which is the traversal order used
/// for statistics: floor, intake, then bins aisle-major.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Location {
    Plancher,
    #[default]
    Entree,
    Bin(Aisle, Level),
}

impl Location {
    pub const ENTREE_KEY: &'static str = "entree";
    pub const PLANCHER_KEY: &'static str = "plancher";

    /// Every valid location, in traversal order.
    pub fn all() -> impl Iterator<Item = Location> {
        [Location::Plancher, Location::Entree]
            .into_iter()
            .chain(Self::bins())
    }

    /// The 14 aisle/level bins, aisle-major.
    pub fn bins() -> impl Iterator<Item = Location> {
        Aisle::ALL
            .into_iter()
            .flat_map(|aisle| Level::ALL.into_iter().map(move |level| Location::Bin(aisle, level)))
    }

    /// Operator-facing label.
    pub fn label(&self) -> String {
        match self {
            Location::Entree => "Entrée".to_string(),
            Location::Plancher => "Plancher".to_string(),
            Location::Bin(aisle, level) => format!("Allée {} - {}", aisle.as_str(), level.as_str()),
        }
    }

    pub fn is_bin(&self) -> bool {
        matches!(self, Location::Bin(..))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Entree => f.write_str(Self::ENTREE_KEY),
            Location::Plancher => f.write_str(Self::PLANCHER_KEY),
            Location::Bin(aisle, level) => write!(f, "{}_{}", aisle.as_str(), level.as_str()),
        }
    }
}

impl FromStr for Location {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ENTREE_KEY => Ok(Location::Entree),
            Self::PLANCHER_KEY => Ok(Location::Plancher),
            _ => {
                let (aisle, level) = s
                    .split_once('_')
                    .ok_or_else(|| DomainError::validation(format!("unknown location `{s}`")))?;
                Ok(Location::Bin(aisle.parse()?, level.parse()?))
            }
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
