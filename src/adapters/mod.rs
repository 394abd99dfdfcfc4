// Adapters layer: concrete collaborators for the geocoding and rendering ports.

pub mod geocoder;
pub mod html_map;
pub mod json_output;
pub mod text_list;

pub use geocoder::GoogleGeocoder;
pub use html_map::HtmlMapRenderer;
pub use json_output::JsonRenderer;
pub use text_list::TextListRenderer;
