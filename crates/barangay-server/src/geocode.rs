//! Reverse geocoding against a Nominatim-compatible `/reverse` endpoint.

use std::time::Duration;

use barangay_core::geo::ReverseGeocoder;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("geocoder request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("geocoder returned no address: {0}")]
  NoAddress(String),
}

/// Async client for `GET {base_url}/reverse?format=jsonv2&lat=..&lon=..`.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct NominatimGeocoder {
  client:   Client,
  base_url: String,
}

impl NominatimGeocoder {
  pub fn new(
    base_url: &str,
    user_agent: &str,
    timeout: Duration,
  ) -> Result<Self, GeocodeError> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(user_agent)
      .build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }
}

/// The part of a Nominatim reverse response we read.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
  display_name: Option<String>,
  /// Present instead of an address, e.g. "Unable to geocode".
  error:        Option<String>,
}

impl ReverseResponse {
  fn into_address(self) -> Result<String, GeocodeError> {
    match self.display_name.filter(|name| !name.trim().is_empty()) {
      Some(name) => Ok(name),
      None => Err(GeocodeError::NoAddress(
        self.error.unwrap_or_else(|| "empty response".to_string()),
      )),
    }
  }
}

impl ReverseGeocoder for NominatimGeocoder {
  type Error = GeocodeError;

  async fn resolve(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError> {
    let resp = self
      .client
      .get(format!("{}/reverse", self.base_url))
      .query(&[
        ("format", "jsonv2".to_string()),
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
      ])
      .send()
      .await?
      .error_for_status()?;

    let body: ReverseResponse = resp.json().await?;
    body.into_address()
  }
}
