/// Static taxonomy of entity groups used to scope the line chart.
///
/// Membership lists are fixed allow-lists. Names that do not occur in the
/// data are tolerated here and simply produce no series downstream.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::schema::WORLD_ENTITY;

/// Closed set of region keys offered by the region control.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RegionKey {
    #[default]
    World,
    NorthAmerica,
    SouthAmerica,
    WestEurope,
    EastEurope,
    Africa,
    WestAsia,
    EastAsia,
    AustraliaNewZealand,
}

impl RegionKey {
    /// Control order.
    pub const ALL: [RegionKey; 9] = [
        RegionKey::World,
        RegionKey::NorthAmerica,
        RegionKey::SouthAmerica,
        RegionKey::WestEurope,
        RegionKey::EastEurope,
        RegionKey::Africa,
        RegionKey::WestAsia,
        RegionKey::EastAsia,
        RegionKey::AustraliaNewZealand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKey::World => "world",
            RegionKey::NorthAmerica => "north_america",
            RegionKey::SouthAmerica => "south_america",
            RegionKey::WestEurope => "west_europe",
            RegionKey::EastEurope => "east_europe",
            RegionKey::Africa => "africa",
            RegionKey::WestAsia => "west_asia",
            RegionKey::EastAsia => "east_asia",
            RegionKey::AustraliaNewZealand => "australia_new_zealand",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegionKey::World => "World",
            RegionKey::NorthAmerica => "North America",
            RegionKey::SouthAmerica => "South America",
            RegionKey::WestEurope => "West Europe",
            RegionKey::EastEurope => "East Europe",
            RegionKey::Africa => "Africa",
            RegionKey::WestAsia => "West Asia",
            RegionKey::EastAsia => "East Asia",
            RegionKey::AustraliaNewZealand => "Australia & New Zealand",
        }
    }

    /// Built-in member list. Spellings are kept as listed even where they
    /// likely differ from the source naming ("Slovokia", "Columbia", ...).
    pub fn builtin_members(&self) -> &'static [&'static str] {
        match self {
            RegionKey::World => &[WORLD_ENTITY],
            RegionKey::NorthAmerica => &["United States", "Mexico", "Canada"],
            RegionKey::SouthAmerica => &["Brazil", "Peru", "Columbia", "Argentina", "Ecuador"],
            RegionKey::WestEurope => &["France", "Germany", "United Kingdom", "Italy", "Spain"],
            RegionKey::EastEurope => &[
                "Russian Federation",
                "Czech Republic",
                "Slovokia",
                "Poland",
                "Serbia",
                "Romania",
                "Hungary",
            ],
            RegionKey::Africa => &[
                "Egypt, Arab Rep.",
                "Algeria",
                "Nigera",
                "Congo, Rep.",
                "Chad",
                "Kenya",
                "Morocco",
            ],
            RegionKey::WestAsia => &[
                "Afghanistan",
                "Iran, Islamic Rep.",
                "Iraq",
                "Israel",
                "Syrian Arab Republic",
                "United Arab Emirates",
                "Turkey",
                "Saudi Arabia",
            ],
            RegionKey::EastAsia => &[
                "China",
                "Japan",
                "Korea, Rep",
                "India",
                "Vietnam",
                "Philippines",
            ],
            RegionKey::AustraliaNewZealand => &["Australia", "New Zealand"],
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionKey {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        RegionKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ExplorerError::UnknownRegion(s.to_string()))
    }
}

/// A named group of entity names, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub key: RegionKey,
    pub name: String,
    members: Vec<String>,
}

impl Region {
    /// Duplicate members collapse onto their first occurrence.
    pub fn new<I, S>(key: RegionKey, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for member in members {
            let member = member.into();
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        Self {
            key,
            name: name.into(),
            members: unique,
        }
    }

    pub fn builtin(key: RegionKey) -> Self {
        Self::new(key, key.label(), key.builtin_members().iter().copied())
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.members.iter().any(|m| m == entity)
    }
}

/// One entry of the region dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionOption {
    pub label: String,
    pub value: RegionKey,
}

/// Mapping from region key to region definition.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: BTreeMap<RegionKey, Region>,
}

impl RegionCatalog {
    pub fn builtin() -> Self {
        Self::from_regions(RegionKey::ALL.into_iter().map(Region::builtin))
    }

    /// Later definitions of the same key replace earlier ones.
    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            regions: regions.into_iter().map(|r| (r.key, r)).collect(),
        }
    }

    pub fn regions(&self) -> &BTreeMap<RegionKey, Region> {
        &self.regions
    }

    pub fn get(&self, key: RegionKey) -> Result<&Region> {
        self.regions
            .get(&key)
            .ok_or_else(|| ExplorerError::UnknownRegion(key.to_string()))
    }

    /// Resolve a control value such as `"west_europe"`.
    pub fn lookup(&self, key: &str) -> Result<&Region> {
        self.get(key.parse::<RegionKey>()?)
    }

    /// Dropdown entries in control order.
    pub fn options(&self) -> Vec<RegionOption> {
        self.regions
            .values()
            .map(|r| RegionOption {
                label: r.name.clone(),
                value: r.key,
            })
            .collect()
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
