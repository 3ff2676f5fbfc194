//! Error type for `barangay-media`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Empty, absolute, or escaping the storage root.
  #[error("invalid media path: {0:?}")]
  InvalidPath(String),

  #[error("media not found: {0}")]
  NotFound(String),

  #[error("signed url has expired")]
  Expired,

  #[error("signature does not match")]
  BadSignature,

  #[error("signing secret is not a usable HMAC key")]
  InvalidSecret,

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
