use crate::domain::hours::Hours;
use crate::utils::error::{FinderError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const METERS_PER_MILE: f64 = 1609.344;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Used for "use my location" when no real device fix is wired in.
pub const DOWNTOWN_SEATTLE: Location = Location {
    latitude: 47.6062,
    longitude: -122.3321,
};

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(FinderError::invalid_argument(format!(
                "latitude {} is outside -90..90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(FinderError::invalid_argument(format!(
                "longitude {} is outside -180..180",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lng"`, tolerating surrounding quotes and whitespace.
impl FromStr for Location {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches(|c| c == '"' || c == '\'');
        let (lat, lng) = trimmed.split_once(',').ok_or_else(|| {
            FinderError::invalid_argument(format!("expected 'lat,lng', got '{}'", s))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<f64>().map_err(|e| {
                FinderError::invalid_argument(format!("bad coordinate '{}': {}", part.trim(), e))
            })
        };
        Self::new(parse(lat)?, parse(lng)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenterType {
    Library,
    CommunityCenter,
    EventHall,
    Other,
}

impl CenterType {
    pub const ALL: [CenterType; 4] = [
        CenterType::Library,
        CenterType::CommunityCenter,
        CenterType::EventHall,
        CenterType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CenterType::Library => "Library",
            CenterType::CommunityCenter => "Community Center",
            CenterType::EventHall => "Event Hall",
            CenterType::Other => "Other",
        }
    }
}

impl fmt::Display for CenterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts "Community Center", "community-center", "COMMUNITY_CENTER" and so on.
impl FromStr for CenterType {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "library" => Ok(CenterType::Library),
            "community center" => Ok(CenterType::CommunityCenter),
            "event hall" => Ok(CenterType::EventHall),
            "other" => Ok(CenterType::Other),
            _ => Err(FinderError::invalid_argument(format!(
                "unknown center type '{}'",
                s.trim()
            ))),
        }
    }
}

/// One cooling center from the catalog. Built once at load time, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Center {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Location,
    #[serde(rename = "type")]
    pub kind: CenterType,
    pub hours: Hours,
    pub features: Vec<String>,
    pub notes: Option<String>,
}

/// Request-scoped selection criteria. The default admits every center.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Allowed types; empty means all types.
    pub types: BTreeSet<CenterType>,
    /// When set, only centers open at this local wall-clock instant match.
    pub open_at: Option<NaiveDateTime>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_types<I: IntoIterator<Item = CenterType>>(mut self, types: I) -> Self {
        self.types.extend(types);
        self
    }

    pub fn open_at(mut self, at: NaiveDateTime) -> Self {
        self.open_at = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCenter<'a> {
    pub center: &'a Center,
    pub distance_m: f64,
}

impl RankedCenter<'_> {
    pub fn distance_miles(&self) -> f64 {
        self.distance_m / METERS_PER_MILE
    }
}

/// Centers ordered nearest first; equal distances keep catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult<'a> {
    entries: Vec<RankedCenter<'a>>,
}

impl<'a> RankedResult<'a> {
    /// `entries` must already be sorted ascending by distance.
    pub(crate) fn from_sorted(entries: Vec<RankedCenter<'a>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCenter<'a>> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[RankedCenter<'a>] {
        &self.entries
    }

    pub fn nearest(&self) -> Option<&RankedCenter<'a>> {
        self.entries.first()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Drops every entry farther than `max_meters`. The result is a prefix of `self`.
    pub fn within(mut self, max_meters: f64) -> Self {
        let keep = self
            .entries
            .iter()
            .take_while(|entry| entry.distance_m <= max_meters)
            .count();
        self.entries.truncate(keep);
        self
    }
}

impl<'a> IntoIterator for RankedResult<'a> {
    type Item = RankedCenter<'a>;
    type IntoIter = std::vec::IntoIter<RankedCenter<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'r, 'a> IntoIterator for &'r RankedResult<'a> {
    type Item = &'r RankedCenter<'a>;
    type IntoIter = std::slice::Iter<'r, RankedCenter<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry<'a> {
    pub center: &'a Center,
    pub distance_m: Option<f64>,
    pub open_now: bool,
}

impl MapEntry<'_> {
    pub fn distance_miles(&self) -> Option<f64> {
        self.distance_m.map(|m| m / METERS_PER_MILE)
    }
}

/// Everything a renderer needs for one response; entry order is display order.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView<'a> {
    pub origin: Option<Location>,
    pub entries: Vec<MapEntry<'a>>,
    pub reference_time: NaiveDateTime,
    pub notice: Option<String>,
}

impl<'a> MapView<'a> {
    pub fn ranked(origin: Location, result: &RankedResult<'a>, at: NaiveDateTime) -> Self {
        let entries = result
            .iter()
            .map(|ranked| MapEntry {
                center: ranked.center,
                distance_m: Some(ranked.distance_m),
                open_now: ranked.center.hours.is_open_at(at),
            })
            .collect();

        Self {
            origin: Some(origin),
            entries,
            reference_time: at,
            notice: None,
        }
    }

    /// The whole catalog in catalog order, used when no location is known.
    pub fn unranked(catalog: &'a [Center], at: NaiveDateTime) -> Self {
        let entries = catalog
            .iter()
            .map(|center| MapEntry {
                center,
                distance_m: None,
                open_now: center.hours.is_open_at(at),
            })
            .collect();

        Self {
            origin: None,
            entries,
            reference_time: at,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rejects_out_of_range() {
        assert!(Location::new(47.6, -122.3).is_ok());
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
        assert!(Location::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_location_from_str() {
        let location: Location = "\"47.6062, -122.3321\"".parse().unwrap();
        assert_eq!(location, DOWNTOWN_SEATTLE);
        assert!("47.6".parse::<Location>().is_err());
        assert!("north,west".parse::<Location>().is_err());
        assert!("95.0,10.0".parse::<Location>().is_err());
    }

    #[test]
    fn test_center_type_parsing_variants() {
        assert_eq!("Library".parse::<CenterType>().unwrap(), CenterType::Library);
        assert_eq!(
            "community-center".parse::<CenterType>().unwrap(),
            CenterType::CommunityCenter
        );
        assert_eq!(
            " Community   Center ".parse::<CenterType>().unwrap(),
            CenterType::CommunityCenter
        );
        assert_eq!("EVENT_HALL".parse::<CenterType>().unwrap(), CenterType::EventHall);
        assert!("swimming pool".parse::<CenterType>().is_err());
    }

    #[test]
    fn test_center_type_label_round_trips() {
        for kind in CenterType::ALL {
            assert_eq!(kind.label().parse::<CenterType>().unwrap(), kind);
        }
    }
}
