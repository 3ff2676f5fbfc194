//! Resident locations and the [`ReverseGeocoder`] collaborator.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Shown in place of an address when reverse geocoding fails.
pub const ADDRESS_PLACEHOLDER: &str = "Address unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude:  f64,
  pub longitude: f64,
}

/// Turns coordinates into a human-readable address.
pub trait ReverseGeocoder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn resolve(
    &self,
    latitude: f64,
    longitude: f64,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Best-effort address for `location`. Failures degrade to
/// [`ADDRESS_PLACEHOLDER`] and never block the caller.
pub async fn describe_location<G: ReverseGeocoder>(
  geocoder: &G,
  location: Location,
) -> String {
  match geocoder.resolve(location.latitude, location.longitude).await {
    Ok(address) if !address.trim().is_empty() => address,
    Ok(_) => ADDRESS_PLACEHOLDER.to_string(),
    Err(e) => {
      tracing::warn!(
        latitude = location.latitude,
        longitude = location.longitude,
        error = %e,
        "reverse geocoding failed"
      );
      ADDRESS_PLACEHOLDER.to_string()
    }
  }
}
