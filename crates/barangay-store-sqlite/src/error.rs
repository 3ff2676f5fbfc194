//! Error type for `barangay-store-sqlite`.

use barangay_core::store::{FailureKind, RemoteFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] barangay_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("resident not found: {0}")]
  ResidentNotFound(uuid::Uuid),

  /// One resident record per submitting account.
  #[error("account {0} already has a resident record")]
  DuplicateAccount(uuid::Uuid),
}

impl RemoteFailure for Error {
  fn failure_kind(&self) -> FailureKind {
    match self {
      Error::Database(
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_),
      ) => FailureKind::Network,
      Error::DuplicateAccount(_) => FailureKind::Conflict,
      _ => FailureKind::Rejected,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
