pub mod catalog;
pub mod distance;
pub mod filter;
pub mod finder;
pub mod resolver;

pub use crate::domain::model::{
    Center, CenterType, Filter, Location, MapEntry, MapView, RankedCenter, RankedResult,
};
pub use crate::domain::ports::{ConfigProvider, Geocoder, Renderer, Storage};
pub use crate::utils::error::Result;
