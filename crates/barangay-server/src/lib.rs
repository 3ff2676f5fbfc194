//! Wiring for the barangay registry server: configuration and the HTTP
//! reverse geocoder. The binary in `main.rs` assembles the rest.

pub mod geocode;
pub mod settings;

pub use geocode::NominatimGeocoder;
pub use settings::ServerConfig;
