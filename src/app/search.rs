use crate::adapters::{GoogleGeocoder, HtmlMapRenderer, JsonRenderer, TextListRenderer};
use crate::config::OutputFormat;
use crate::core::catalog::Catalog;
use crate::core::finder::{CoolFinder, FindRequest};
use crate::core::{ConfigProvider, Renderer, Storage};
use crate::utils::error::{FinderError, Result};
use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::Duration;

pub const OUTPUT_STEM: &str = "cooling_centers";

/// What one run produced.
#[derive(Debug)]
pub struct SearchReport {
    pub rendered: String,
    /// File name below the output path, e.g. `cooling_centers.html`.
    pub file_name: String,
    pub notice: Option<String>,
    pub matches: usize,
    /// Set when the location could not be obtained and the full catalog was shown.
    pub degraded: Option<FinderError>,
}

impl SearchReport {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

pub struct SearchApp<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    format: OutputFormat,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SearchApp<S, C> {
    pub fn new(storage: S, config: C, format: OutputFormat) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.catalog_timeout_seconds()))
            .build()?;
        Ok(Self {
            storage,
            config,
            format,
            client,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self.format {
            OutputFormat::Html => Box::new(
                HtmlMapRenderer::new()
                    .with_title(self.config.map_title())
                    .with_zoom(self.config.map_zoom())
                    .with_default_center(self.config.device_location()),
            ),
            OutputFormat::Text => Box::new(TextListRenderer),
            OutputFormat::Json => Box::new(JsonRenderer { pretty: true }),
        }
    }

    fn geocoder(&self) -> Result<GoogleGeocoder> {
        let geocoder = GoogleGeocoder::from_config(&self.config)?;
        if !geocoder.has_credential() {
            tracing::warn!("No geocoding API key configured, address search is disabled");
        }
        Ok(match self.config.geocoder_region() {
            Some(region) => geocoder.with_region(region),
            None => geocoder,
        })
    }

    /// Loads the catalog and answers `request`, or renders the overview when
    /// no location was given.
    pub async fn run(
        &self,
        request: Option<&FindRequest>,
        now: NaiveDateTime,
    ) -> Result<SearchReport> {
        let catalog = Catalog::load(self.config.catalog_source(), &self.client).await?;
        let finder = CoolFinder::new(catalog, self.geocoder()?, self.renderer())
            .with_device_location(self.config.device_location());
        let file_name = format!("{}.{}", OUTPUT_STEM, finder.renderer().extension());

        let Some(request) = request else {
            tracing::info!("No location given, showing all cooling centers");
            return Ok(SearchReport {
                rendered: finder.overview(now)?,
                file_name,
                notice: None,
                matches: finder.catalog().len(),
                degraded: None,
            });
        };

        let outcome = finder.find(request).await?;
        let matches = if outcome.is_degraded() {
            finder.catalog().len()
        } else {
            outcome.ranked.len()
        };
        Ok(SearchReport {
            rendered: outcome.rendered,
            file_name,
            notice: outcome.notice,
            matches,
            degraded: outcome.degraded,
        })
    }

    /// Writes the report below the configured output path and returns where it went.
    pub async fn save(&self, report: &SearchReport) -> Result<String> {
        self.storage
            .write_file(&report.file_name, report.rendered.as_bytes())
            .await?;
        let location = format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            report.file_name
        );
        tracing::info!("Output saved to {}", location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::domain::model::{Location, DOWNTOWN_SEATTLE};
    use tempfile::TempDir;

    struct TestConfig {
        catalog: String,
        output: String,
    }

    impl ConfigProvider for TestConfig {
        fn catalog_source(&self) -> &str {
            &self.catalog
        }
        fn geocoder_endpoint(&self) -> &str {
            "http://127.0.0.1:9/geocode/json"
        }
        fn geocoder_api_key(&self) -> Option<&str> {
            None
        }
        fn geocoder_timeout_seconds(&self) -> u64 {
            1
        }
        fn device_location(&self) -> Location {
            DOWNTOWN_SEATTLE
        }
        fn output_path(&self) -> &str {
            &self.output
        }
        fn map_title(&self) -> &str {
            "Test Cool Finder"
        }
    }

    fn app(temp_dir: &TempDir, format: OutputFormat) -> SearchApp<LocalStorage, TestConfig> {
        let catalog = temp_dir.path().join("centers.csv");
        std::fs::write(
            &catalog,
            "name,address,coordinates,type,hours\n\
             Central Library,1000 4th Ave,\"47.6067,-122.3325\",Library,24/7\n",
        )
        .unwrap();
        let output = temp_dir.path().join("out").to_str().unwrap().to_string();
        SearchApp::new(
            LocalStorage::new(output.clone()),
            TestConfig {
                catalog: catalog.to_str().unwrap().to_string(),
                output,
            },
            format,
        )
        .unwrap()
    }

    #[test]
    fn test_renderer_follows_format() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(app(&temp_dir, OutputFormat::Html).renderer().extension(), "html");
        assert_eq!(app(&temp_dir, OutputFormat::Text).renderer().extension(), "txt");
        assert_eq!(app(&temp_dir, OutputFormat::Json).renderer().extension(), "json");
    }

    #[tokio::test]
    async fn test_overview_without_location() {
        let temp_dir = TempDir::new().unwrap();
        let app = app(&temp_dir, OutputFormat::Html);
        let now = chrono::NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let report = app.run(None, now).await.unwrap();
        assert_eq!(report.file_name, "cooling_centers.html");
        assert_eq!(report.matches, 1);
        assert!(report.rendered.contains("Test Cool Finder"));
        assert!(report.rendered.contains("Central Library"));

        let saved = app.save(&report).await.unwrap();
        assert!(saved.ends_with("out/cooling_centers.html"));
        assert!(temp_dir.path().join("out/cooling_centers.html").exists());
    }

    #[tokio::test]
    async fn test_missing_catalog_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let app = SearchApp::new(
            LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
            TestConfig {
                catalog: temp_dir.path().join("absent.csv").to_str().unwrap().to_string(),
                output: temp_dir.path().to_str().unwrap().to_string(),
            },
            OutputFormat::Text,
        )
        .unwrap();

        let err = app
            .run(None, chrono::Local::now().naive_local())
            .await
            .unwrap_err();
        assert!(matches!(err, FinderError::DataLoadError { .. }));
    }
}
