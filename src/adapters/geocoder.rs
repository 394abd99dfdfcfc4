use crate::domain::model::Location;
use crate::domain::ports::{ConfigProvider, Geocoder};
use crate::utils::error::{FinderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Geocoder speaking the Google Geocoding JSON API.
///
/// Without an API key every lookup fails with `UpstreamUnavailable`, so callers
/// can still fall back to coordinates or device location.
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    region: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            region: None,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.geocoder_endpoint(),
            config.geocoder_api_key().map(str::to_string),
            Duration::from_secs(config.geocoder_timeout_seconds()),
        )
    }

    /// Biases results toward a country, e.g. `"us"`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location> {
        let address = address.trim();
        if address.is_empty() {
            return Err(FinderError::invalid_argument("address is empty"));
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FinderError::upstream("no geocoding API key configured"))?;

        let mut query = vec![("address", address), ("key", key)];
        if let Some(region) = &self.region {
            query.push(("region", region.as_str()));
        }

        tracing::debug!("Geocoding '{}' via {}", address, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| FinderError::upstream(format!("geocoding request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Geocoder response status: {}", status);
        if !status.is_success() {
            return Err(FinderError::upstream(format!("geocoder returned HTTP {}", status)));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| FinderError::upstream(format!("unreadable geocoder response: {}", e)))?;

        match body.status.as_str() {
            "OK" => {
                let first = body.results.into_iter().next().ok_or_else(|| {
                    FinderError::NotFound {
                        query: address.to_string(),
                    }
                })?;
                let LatLng { lat, lng } = first.geometry.location;
                let location = Location::new(lat, lng).map_err(|_| {
                    FinderError::upstream(format!(
                        "geocoder returned invalid coordinates {}, {}",
                        lat, lng
                    ))
                })?;
                tracing::info!(
                    "Resolved '{}' to {} ({})",
                    address,
                    location,
                    first.formatted_address.as_deref().unwrap_or("no formatted address")
                );
                Ok(location)
            }
            "ZERO_RESULTS" => Err(FinderError::NotFound {
                query: address.to_string(),
            }),
            other => Err(FinderError::upstream(match body.error_message {
                Some(message) => format!("{}: {}", other, message),
                None => other.to_string(),
            })),
        }
    }
}
