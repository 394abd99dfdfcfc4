use crate::domain::hours::Hours;
use crate::domain::model::{Center, CenterType, Location};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::is_remote_source;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Raw CSV row, before any field is interpreted.
#[derive(Debug, Deserialize)]
struct CenterRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
    address: String,
    coordinates: String,
    #[serde(rename = "type")]
    kind: String,
    hours: String,
    #[serde(default)]
    features: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// The full list of cooling centers, in file order. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    centers: Vec<Center>,
}

impl Catalog {
    /// Builds a catalog from already-constructed centers, rejecting duplicate ids
    /// and out-of-range coordinates.
    pub fn from_centers(centers: Vec<Center>) -> Result<Self> {
        let mut seen = HashSet::new();
        for center in &centers {
            center.location.validate().map_err(|e| {
                FinderError::data_load(format!("center '{}': {}", center.id, e))
            })?;
            if !seen.insert(center.id.as_str()) {
                return Err(FinderError::data_load(format!(
                    "duplicate center id '{}'",
                    center.id
                )));
            }
        }
        Ok(Self { centers })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut centers = Vec::new();
        for (index, record) in csv_reader.deserialize::<CenterRecord>().enumerate() {
            let row = index + 1;
            let record =
                record.map_err(|e| FinderError::data_load(format!("row {}: {}", row, e)))?;
            let center = record
                .into_center(row)
                .map_err(|e| FinderError::data_load(format!("row {}: {}", row, e)))?;
            centers.push(center);
        }

        Self::from_centers(centers)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            FinderError::data_load(format!("cannot open {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_csv_reader(file)
    }

    /// Loads from a local path or an http(s) URL.
    pub async fn load(source: &str, client: &Client) -> Result<Self> {
        let catalog = if is_remote_source(source) {
            tracing::debug!("Fetching catalog from {}", source);
            let response = client
                .get(source)
                .send()
                .await
                .map_err(|e| FinderError::data_load(format!("fetching {}: {}", source, e)))?;
            if !response.status().is_success() {
                return Err(FinderError::data_load(format!(
                    "fetching {}: HTTP {}",
                    source,
                    response.status()
                )));
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| FinderError::data_load(format!("reading {}: {}", source, e)))?;
            Self::from_csv_reader(body.as_ref())?
        } else {
            let bytes = tokio::fs::read(source)
                .await
                .map_err(|e| FinderError::data_load(format!("cannot open {}: {}", source, e)))?;
            Self::from_csv_reader(bytes.as_slice())?
        };

        tracing::info!("Loaded {} cooling centers from {}", catalog.len(), source);
        Ok(catalog)
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Center> {
        self.centers.iter().find(|center| center.id == id)
    }

    /// Centers whose type is in `types`, in catalog order.
    pub fn centers_of_types<'a>(
        &'a self,
        types: &'a [CenterType],
    ) -> impl Iterator<Item = &'a Center> + 'a {
        self.centers
            .iter()
            .filter(move |center| types.contains(&center.kind))
    }

    /// Centers open at `at`, in catalog order.
    pub fn open_at(&self, at: NaiveDateTime) -> impl Iterator<Item = &Center> + '_ {
        self.centers
            .iter()
            .filter(move |center| center.hours.is_open_at(at))
    }
}

impl CenterRecord {
    fn into_center(self, row: usize) -> Result<Center> {
        let location: Location = self.coordinates.parse()?;
        let kind: CenterType = self.kind.parse()?;
        let hours: Hours = self.hours.parse()?;
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => row.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(FinderError::invalid_argument("name is empty"));
        }

        Ok(Center {
            id,
            name: self.name,
            address: self.address,
            location,
            kind,
            hours,
            features: parse_features(self.features.as_deref().unwrap_or_default()),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Parses list literals such as `['Air conditioning', "Water"]` or `a, b`.
fn parse_features(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"' | '\''))
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
