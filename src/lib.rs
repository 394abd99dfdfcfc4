pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, OutputFormat};

pub use adapters::{GoogleGeocoder, HtmlMapRenderer, JsonRenderer, TextListRenderer};
pub use app::{SearchApp, SearchReport};
pub use core::catalog::Catalog;
pub use core::finder::{CoolFinder, FindOutcome, FindRequest, LocationQuery};
pub use core::resolver::resolve;
pub use domain::hours::Hours;
pub use domain::model::{Center, CenterType, Filter, Location, RankedCenter, RankedResult};
pub use utils::error::{FinderError, Result};
