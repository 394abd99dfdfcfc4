pub mod cli;
pub mod toml_config;

use crate::utils::error::{FinderError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::adapters::geocoder::GOOGLE_GEOCODE_ENDPOINT;
#[cfg(feature = "cli")]
use crate::core::finder::{FindRequest, LocationQuery};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{CenterType, Filter, Location};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use toml_config::SearchConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "cool-finder")]
#[command(about = "Find the nearest public cooling center during extreme heat")]
pub struct CliConfig {
    /// Load settings from a TOML file. The file replaces --catalog,
    /// --catalog-timeout, --geocoder-endpoint, --geocoder-timeout, --region,
    /// --device-lat/--device-lon, --output-path and --format. --api-key is
    /// used only when the file sets no key; location and search flags
    /// override its [search] table.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Catalog CSV, as a local path or http(s) URL
    #[arg(long, default_value = "cooling_center_data.csv")]
    pub catalog: String,

    /// Seconds allowed for fetching a remote catalog
    #[arg(long, default_value = "30")]
    pub catalog_timeout: u64,

    #[arg(long, default_value = GOOGLE_GEOCODE_ENDPOINT)]
    pub geocoder_endpoint: String,

    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "10")]
    pub geocoder_timeout: u64,

    /// Country bias for geocoding, e.g. "us"
    #[arg(long)]
    pub region: Option<String>,

    /// Position reported for --use-my-location
    #[arg(long, default_value = "47.6062", allow_negative_numbers = true)]
    pub device_lat: f64,

    #[arg(long, default_value = "-122.3321", allow_negative_numbers = true)]
    pub device_lon: f64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Print the result instead of writing it under --output-path
    #[arg(long)]
    pub stdout: bool,

    /// Street address to search from
    #[arg(long, conflicts_with_all = ["lat", "use_my_location"])]
    pub address: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    #[arg(long, conflicts_with = "lat")]
    pub use_my_location: bool,

    /// Center types to include, comma separated (e.g. "library,community-center")
    #[arg(long = "types", value_delimiter = ',')]
    pub types: Vec<CenterType>,

    /// Only centers open at the reference time
    #[arg(long)]
    pub open_now: bool,

    /// Reference time as local "YYYY-MM-DDTHH:MM"; defaults to now
    #[arg(long, value_parser = parse_reference_time)]
    pub at: Option<NaiveDateTime>,

    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    #[arg(long)]
    pub max_distance_miles: Option<f64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("geocoder_endpoint", &self.geocoder_endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("format", &self.format)
            .field("address", &self.address)
            .field("lat", &self.lat)
            .field("lon", &self.lon)
            .field("use_my_location", &self.use_my_location)
            .field("types", &self.types)
            .field("open_now", &self.open_now)
            .field("at", &self.at)
            .field("limit", &self.limit)
            .field("max_distance_miles", &self.max_distance_miles)
            .finish_non_exhaustive()
    }
}

pub fn parse_reference_time(raw: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| FinderError::InvalidConfigValueError {
            field: "at".to_string(),
            value: raw.to_string(),
            reason: "expected YYYY-MM-DDTHH:MM".to_string(),
        })
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Where the user is, or `None` when no location input was given.
    pub fn location_query(&self) -> Result<Option<LocationQuery>> {
        if let Some(address) = &self.address {
            validation::validate_non_empty_string("address", address)?;
            return Ok(Some(LocationQuery::Address(address.clone())));
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Ok(Some(LocationQuery::Coordinates(Location::new(lat, lon)?)));
        }
        if self.use_my_location {
            return Ok(Some(LocationQuery::Device));
        }
        Ok(None)
    }

    /// Builds the request, letting flags override `defaults` from a config file.
    pub fn build_request(
        &self,
        now: NaiveDateTime,
        defaults: &SearchConfig,
    ) -> Result<Option<FindRequest>> {
        let Some(location) = self.location_query()? else {
            return Ok(None);
        };
        let reference_time = self.at.unwrap_or(now);

        let types = if self.types.is_empty() {
            defaults.types()?
        } else {
            self.types.clone()
        };
        let mut filter = Filter::all().with_types(types);
        if self.open_now || defaults.show_only_open.unwrap_or(false) {
            filter = filter.open_at(reference_time);
        }

        let mut request = FindRequest::new(location, reference_time).with_filter(filter);
        request.limit = self.limit.or(defaults.limit);
        if let Some(miles) = self.max_distance_miles.or(defaults.max_distance_miles) {
            request = request.within_miles(miles);
        }
        Ok(Some(request))
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn catalog_source(&self) -> &str {
        &self.catalog
    }

    fn catalog_timeout_seconds(&self) -> u64 {
        self.catalog_timeout
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder_endpoint
    }

    fn geocoder_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    fn geocoder_timeout_seconds(&self) -> u64 {
        self.geocoder_timeout
    }

    fn geocoder_region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn device_location(&self) -> Location {
        Location {
            latitude: self.device_lat,
            longitude: self.device_lon,
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_catalog_source("catalog", &self.catalog)?;
        validation::validate_positive_number("catalog_timeout", self.catalog_timeout, 1)?;
        validation::validate_url("geocoder_endpoint", &self.geocoder_endpoint)?;
        validation::validate_positive_number("geocoder_timeout", self.geocoder_timeout, 1)?;
        validation::validate_range("device_lat", self.device_lat, -90.0, 90.0)?;
        validation::validate_range("device_lon", self.device_lon, -180.0, 180.0)?;
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(miles) = self.max_distance_miles {
            validation::validate_range("max_distance_miles", miles, 0.0, f64::MAX)?;
        }
        Ok(())
    }
}
