//! Handler for `GET /statuses`.

use axum::Json;
use barangay_core::status::{RegistryEntry, registry};

/// `GET /statuses`: every lifecycle status in code order, with its display
/// label, tone and the actions an admin may take from it.
pub async fn list() -> Json<Vec<RegistryEntry>> { Json(registry()) }
