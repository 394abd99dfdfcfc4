use crate::adapters::geocoder::GOOGLE_GEOCODE_ENDPOINT;
use crate::config::OutputFormat;
use crate::core::ConfigProvider;
use crate::domain::model::{CenterType, Location, DOWNTOWN_SEATTLE};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    pub device: Option<DeviceConfig>,
    pub map: Option<MapConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub source: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub region: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            api_key: None,
            timeout_seconds: None,
            region: None,
        }
    }
}

impl std::fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("region", &self.region)
            .finish()
    }
}

fn default_geocoder_endpoint() -> String {
    GOOGLE_GEOCODE_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub title: Option<String>,
    pub zoom: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_path() -> String {
    "./output".to_string()
}

/// Request defaults; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub center_types: Option<Vec<String>>,
    pub show_only_open: Option<bool>,
    pub max_distance_miles: Option<f64>,
    pub limit: Option<i64>,
}

impl SearchConfig {
    pub fn types(&self) -> Result<Vec<CenterType>> {
        self.center_types
            .iter()
            .flatten()
            .map(|raw| {
                raw.parse::<CenterType>()
                    .map_err(|_| FinderError::InvalidConfigValueError {
                        field: "search.center_types".to_string(),
                        value: raw.clone(),
                        reason: "Unknown center type".to_string(),
                    })
            })
            .collect()
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FinderError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FinderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GOOGLE_MAPS_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FinderError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Uses `api_key` when the file itself names no usable key, so
    /// `--api-key` and `GOOGLE_MAPS_API_KEY` still apply with `--config`.
    pub fn with_fallback_api_key(mut self, api_key: Option<&str>) -> Self {
        if self.geocoder_api_key().is_none() {
            self.geocoder.api_key = api_key.map(str::to_string);
        }
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_catalog_source("catalog.source", &self.catalog.source)?;
        if let Some(timeout) = self.catalog.timeout_seconds {
            validation::validate_positive_number("catalog.timeout_seconds", timeout, 1)?;
        }
        validation::validate_url("geocoder.endpoint", &self.geocoder.endpoint)?;
        if let Some(timeout) = self.geocoder.timeout_seconds {
            validation::validate_positive_number("geocoder.timeout_seconds", timeout, 1)?;
        }
        if let Some(device) = &self.device {
            validation::validate_range("device.latitude", device.latitude, -90.0, 90.0)?;
            validation::validate_range("device.longitude", device.longitude, -180.0, 180.0)?;
        }
        if let Some(zoom) = self.map.as_ref().and_then(|m| m.zoom) {
            validation::validate_range("map.zoom", zoom, 1, 19)?;
        }
        validation::validate_path("output.path", &self.output.path)?;
        self.search.types()?;
        if let Some(miles) = self.search.max_distance_miles {
            validation::validate_range("search.max_distance_miles", miles, 0.0, f64::MAX)?;
        }
        if let Some(limit) = self.search.limit {
            validation::validate_positive_number(
                "search.limit",
                u64::try_from(limit).unwrap_or(0),
                1,
            )?;
        }
        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_source(&self) -> &str {
        &self.catalog.source
    }

    fn catalog_timeout_seconds(&self) -> u64 {
        self.catalog.timeout_seconds.unwrap_or(30)
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder.endpoint
    }

    fn geocoder_api_key(&self) -> Option<&str> {
        // an unset ${VAR} survives substitution and means "no key"
        self.geocoder
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.contains("${"))
    }

    fn geocoder_timeout_seconds(&self) -> u64 {
        self.geocoder.timeout_seconds.unwrap_or(10)
    }

    fn geocoder_region(&self) -> Option<&str> {
        self.geocoder.region.as_deref()
    }

    fn device_location(&self) -> Location {
        self.device
            .as_ref()
            .map(|d| Location {
                latitude: d.latitude,
                longitude: d.longitude,
            })
            .unwrap_or(DOWNTOWN_SEATTLE)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn map_title(&self) -> &str {
        self.map
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .unwrap_or("Seattle Cool Finder")
    }

    fn map_zoom(&self) -> u8 {
        self.map.as_ref().and_then(|m| m.zoom).unwrap_or(12)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
