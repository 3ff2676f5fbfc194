//! The `ResidentStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `barangay-store-sqlite`).
//! Higher layers (`barangay-api`, the [`crate::sync`] adapter) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  resident::{NewResident, Resident},
  status::ResidentStatus,
  transition::MutationIntent,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ResidentStore::fetch_all`].
#[derive(Debug, Clone, Default)]
pub struct ResidentFilter {
  pub status:     Option<ResidentStatus>,
  pub account_id: Option<Uuid>,
}

// ─── Change notification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "resident_id", rename_all = "snake_case")]
pub enum ChangeEvent {
  Inserted(Uuid),
  Updated(Uuid),
  Deleted(Uuid),
}

impl ChangeEvent {
  pub fn resident_id(&self) -> Uuid {
    match self {
      Self::Inserted(id) | Self::Updated(id) | Self::Deleted(id) => *id,
    }
  }
}

// ─── Failure classification ──────────────────────────────────────────────────

/// How a store failure surfaces to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// The store could not be reached; the user may retry.
  Network,
  /// The store refused the request (missing row, bad data).
  Rejected,
  /// The write collides with an existing record, e.g. a second submission
  /// from the same account.
  Conflict,
}

/// Implemented by backend error types so the sync adapter can tell transport
/// failures from refusals.
pub trait RemoteFailure {
  fn failure_kind(&self) -> FailureKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote resident record store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ResidentStore: Send + Sync {
  type Error: std::error::Error + RemoteFailure + Send + Sync + 'static;

  /// Every resident matching `filter`, most recently created first.
  fn fetch_all(
    &self,
    filter: &ResidentFilter,
  ) -> impl Future<Output = Result<Vec<Resident>, Self::Error>> + Send;

  /// Retrieve a resident by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send;

  /// Persist a new submission in [`ResidentStatus::Pending`].
  ///
  /// Returns an error if the account already owns a resident record.
  fn insert(
    &self,
    input: NewResident,
  ) -> impl Future<Output = Result<Resident, Self::Error>> + Send;

  /// Write exactly the fields named by `intent`, keyed by its resident id.
  ///
  /// Returns an error if the resident does not exist.
  fn update(
    &self,
    intent: &MutationIntent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Physically remove a resident. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// Receive a [`ChangeEvent`] after every successful write.
  fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
