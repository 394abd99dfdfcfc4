use crate::domain::model::{Location, MapView};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for rendered output.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_source(&self) -> &str;
    /// Upper bound for fetching a remote catalog.
    fn catalog_timeout_seconds(&self) -> u64 {
        30
    }
    fn geocoder_endpoint(&self) -> &str;
    /// `None` disables address lookup; coordinate and device lookups still work.
    fn geocoder_api_key(&self) -> Option<&str>;
    fn geocoder_timeout_seconds(&self) -> u64;
    fn geocoder_region(&self) -> Option<&str> {
        None
    }
    fn device_location(&self) -> Location;
    fn output_path(&self) -> &str;
    fn map_title(&self) -> &str {
        "Seattle Cool Finder"
    }
    fn map_zoom(&self) -> u8 {
        12
    }
}

/// Turns a free-text address into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Location>;
}

/// Produces the visual (or textual) presentation of a map view.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &MapView<'_>) -> Result<String>;

    /// File extension for saved output.
    fn extension(&self) -> &'static str;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, view: &MapView<'_>) -> Result<String> {
        (**self).render(view)
    }

    fn extension(&self) -> &'static str {
        (**self).extension()
    }
}
