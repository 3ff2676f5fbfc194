//! Media references and the [`ObjectStorage`] collaborator.
//!
//! Uploaded images and documents live in object storage. A record keeps only
//! the storage path; readable URLs are signed and time-limited, so they are
//! resolved at render time and never persisted.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};

use crate::resident::Resident;

/// A (storage path, resolved URL) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
  pub path: String,
  /// Signed URL, filled in by [`resolve_media`]. Never written to a store.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:  Option<String>,
}

impl MediaRef {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      url:  None,
    }
  }
}

/// Abstraction over a binary object store.
pub trait ObjectStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `data` under `path`, replacing any existing object.
  fn put(
    &self,
    path: &str,
    data: &[u8],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// A URL granting read access to `path` for `ttl`.
  fn signed_url(
    &self,
    path: &str,
    ttl: Duration,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;

  /// Remove the object at `path`. Removing a missing object is not an error.
  fn delete(&self, path: &str)
  -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Fill in signed URLs for every media reference on `resident`.
///
/// Best effort: a reference whose URL cannot be signed keeps `url: None` and
/// the failure is logged.
pub async fn resolve_media<O: ObjectStorage>(
  storage: &O,
  resident: &mut Resident,
  ttl: Duration,
) {
  let resident_id = resident.resident_id;
  for (slot, media) in resident.media_refs_mut() {
    match storage.signed_url(&media.path, ttl).await {
      Ok(url) => media.url = Some(url),
      Err(e) => {
        tracing::warn!(%resident_id, slot, path = %media.path, error = %e, "failed to sign media url");
        media.url = None;
      }
    }
  }
}
