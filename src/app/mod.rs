// Application layer: wires configuration, catalog, geocoder, renderer and storage.

pub mod search;

pub use search::{SearchApp, SearchReport};
