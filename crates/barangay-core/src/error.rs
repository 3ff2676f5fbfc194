//! Error types for `barangay-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{status::ResidentStatus, transition::Action};

/// A boxed error coming from a collaborator (record store, object storage).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Required input was missing or blank. No mutation was attempted.
  #[error("validation failed for `{field}`: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// The action is not defined from the resident's current status.
  #[error("cannot {action} a resident whose status is {from}")]
  IllegalTransition {
    from:   ResidentStatus,
    action: Action,
  },

  /// A status code outside the six defined values reached the storage
  /// boundary.
  #[error("unknown resident status code: {0}")]
  UnknownStatusCode(i64),

  #[error("resident not found: {0}")]
  ResidentNotFound(Uuid),

  /// The collaborator could not be reached.
  #[error("network error: {0}")]
  Network(#[source] BoxError),

  /// The collaborator was reached but refused the request.
  #[error("remote rejected the request: {0}")]
  RemoteRejected(#[source] BoxError),

  /// The write collides with an existing record.
  #[error("{0}")]
  Conflict(#[source] BoxError),
}

impl Error {
  pub(crate) fn blank(field: &'static str) -> Self {
    Self::Validation {
      field,
      message: "must not be empty".to_string(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
