//! [`LocalObjectStore`]: [`ObjectStorage`] over a directory.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  time::Duration,
};

use barangay_core::media::ObjectStorage;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::{Error, Result, signer::UrlSigner};

/// Stores objects as plain files under `root` and hands out signed URLs
/// pointing at `{base_url}/media/{path}`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
  root:     PathBuf,
  base_url: String,
  signer:   UrlSigner,
}

impl LocalObjectStore {
  pub fn new(
    root: impl Into<PathBuf>,
    base_url: impl Into<String>,
    signer: UrlSigner,
  ) -> Self {
    Self {
      root: root.into(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      signer,
    }
  }

  pub fn root(&self) -> &Path { &self.root }

  /// The URL for `path` valid until `expires` (unix seconds).
  pub fn url_for(&self, path: &str, expires: i64) -> String {
    let signature = self.signer.sign(path, expires);
    format!(
      "{}/media/{path}?expires={expires}&signature={signature}",
      self.base_url
    )
  }

  /// Read an object after checking its URL signature against `now`.
  pub async fn read_signed(
    &self,
    path: &str,
    expires: i64,
    signature: &str,
    now: DateTime<Utc>,
  ) -> Result<Bytes> {
    self.signer.verify(path, expires, signature, now)?;
    self.read(path).await
  }

  /// Read an object without any signature check.
  pub async fn read(&self, path: &str) -> Result<Bytes> {
    let file = self.resolve(path)?;
    match tokio::fs::read(&file).await {
      Ok(data) => Ok(Bytes::from(data)),
      Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(path.to_string())),
      Err(e) => Err(e.into()),
    }
  }

  fn resolve(&self, path: &str) -> Result<PathBuf> {
    validate_path(path)?;
    Ok(self.root.join(path))
  }
}

/// Relative, `/`-separated, no `.` or `..` segments, and a conservative
/// character set so paths never need escaping inside a URL.
fn validate_path(path: &str) -> Result<()> {
  let invalid = || Error::InvalidPath(path.to_string());
  if path.is_empty() || path.starts_with('/') {
    return Err(invalid());
  }
  for segment in path.split('/') {
    if segment.is_empty() || segment == "." || segment == ".." {
      return Err(invalid());
    }
    if !segment
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
      return Err(invalid());
    }
  }
  Ok(())
}

// ─── ObjectStorage impl ──────────────────────────────────────────────────────

impl ObjectStorage for LocalObjectStore {
  type Error = Error;

  async fn put(&self, path: &str, data: &[u8]) -> Result<()> {
    let file = self.resolve(path)?;
    if let Some(parent) = file.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&file, data).await?;
    tracing::debug!(path, bytes = data.len(), "media object stored");
    Ok(())
  }

  async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
    validate_path(path)?;
    let expires = UrlSigner::expiry(Utc::now(), ttl);
    Ok(self.url_for(path, expires))
  }

  async fn delete(&self, path: &str) -> Result<()> {
    let file = self.resolve(path)?;
    match tokio::fs::remove_file(&file).await {
      Ok(()) => {
        tracing::debug!(path, "media object removed");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
