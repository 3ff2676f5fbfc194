//! [`SyncAdapter`]: bridges the pure engines to a [`ResidentStore`].
//!
//! The adapter owns the in-memory snapshot of the resident collection that
//! the query engine reads. Every successful write is followed by a full
//! reload rather than an in-place patch. Reloads are ordered last-load-wins:
//! a response belonging to an older reload than the most recently issued one
//! is discarded.
//!
//! Nothing here retries. There is no version token either, so two admins
//! acting on the same record between reloads will silently overwrite each
//! other.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use tokio::{
  sync::{RwLock, broadcast::error::RecvError},
  task::JoinHandle,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  query::{self, ResidentPage, StatusSummary, ViewCriteria},
  resident::{NewResident, Resident},
  store::{FailureKind, RemoteFailure, ResidentFilter, ResidentStore},
  transition::{self, MutationIntent, TransitionCommand},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The most recently applied load.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  /// Most recently created first, as returned by the store.
  pub residents:  Vec<Resident>,
  /// Ticket of the load that produced this snapshot; 0 before the first load.
  pub generation: u64,
  pub loaded_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
  Applied { count: usize },
  /// A newer reload was issued while this one was in flight.
  Superseded,
}

// ─── Adapter ─────────────────────────────────────────────────────────────────

pub struct SyncAdapter<S> {
  store:    Arc<S>,
  snapshot: RwLock<Snapshot>,
  tickets:  AtomicU64,
}

impl<S: ResidentStore> SyncAdapter<S> {
  /// Create an adapter with an empty snapshot. Call [`Self::reload`] before
  /// serving views.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      snapshot: RwLock::new(Snapshot::default()),
      tickets: AtomicU64::new(0),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Loads ─────────────────────────────────────────────────────────────────

  /// Re-fetch the whole collection and replace the snapshot.
  pub async fn reload(&self) -> Result<ReloadOutcome> {
    let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

    let residents = self
      .store
      .fetch_all(&ResidentFilter::default())
      .await
      .map_err(remote)?;

    let mut snapshot = self.snapshot.write().await;
    let latest = self.tickets.load(Ordering::SeqCst);
    if ticket < latest || ticket <= snapshot.generation {
      tracing::debug!(ticket, latest, "discarding stale resident load");
      return Ok(ReloadOutcome::Superseded);
    }

    let count = residents.len();
    *snapshot = Snapshot {
      residents,
      generation: ticket,
      loaded_at: Some(Utc::now()),
    };
    tracing::debug!(ticket, count, "resident snapshot replaced");
    Ok(ReloadOutcome::Applied { count })
  }

  /// Reload whenever the store reports a change, until the store goes away.
  pub fn follow(self: Arc<Self>) -> JoinHandle<()>
  where
    S: 'static,
  {
    let mut changes = self.store.subscribe();
    tokio::spawn(async move {
      loop {
        match changes.recv().await {
          Ok(event) => {
            tracing::debug!(?event, "store change received");
          }
          Err(RecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "change feed lagged");
          }
          Err(RecvError::Closed) => break,
        }
        if let Err(e) = self.reload().await {
          tracing::warn!(error = %e, "reload after store change failed");
        }
      }
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn snapshot(&self) -> Snapshot { self.snapshot.read().await.clone() }

  pub async fn resident(&self, id: Uuid) -> Option<Resident> {
    self
      .snapshot
      .read()
      .await
      .residents
      .iter()
      .find(|r| r.resident_id == id)
      .cloned()
  }

  pub async fn view(&self, criteria: &ViewCriteria) -> ResidentPage {
    query::view(&self.snapshot.read().await.residents, criteria)
  }

  pub async fn summary(&self) -> StatusSummary {
    query::summarize(&self.snapshot.read().await.residents)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Decide `command` against the stored record, persist the resulting
  /// intent, then reload.
  ///
  /// The snapshot may lag the store (a reload can fail after a write has
  /// landed), so the decision never uses it. Validation and
  /// illegal-transition errors never reach the store. On any failure the
  /// snapshot is left as it was.
  pub async fn transition(
    &self,
    id: Uuid,
    command: &TransitionCommand,
  ) -> Result<MutationIntent> {
    let resident = self
      .store
      .get(id)
      .await
      .map_err(remote)?
      .ok_or(Error::ResidentNotFound(id))?;

    let intent = match transition::decide(&resident, command, Utc::now()) {
      Ok(intent) => intent,
      Err(e) => {
        tracing::info!(resident_id = %id, action = %command.action(), error = %e, "transition refused");
        return Err(e);
      }
    };

    self.store.update(&intent).await.map_err(remote)?;
    tracing::info!(
      resident_id = %id,
      action = %intent.action,
      from = %resident.status,
      to = %intent.status,
      "resident transition persisted"
    );

    if let Err(e) = self.reload().await {
      tracing::warn!(resident_id = %id, error = %e, "transition persisted but reload failed");
      return Err(e);
    }
    Ok(intent)
  }

  /// Store a new submission (always Pending), then reload.
  pub async fn submit(&self, input: NewResident) -> Result<Resident> {
    let resident = self.store.insert(input).await.map_err(remote)?;
    tracing::info!(resident_id = %resident.resident_id, "resident submitted");
    self.reload().await?;
    Ok(resident)
  }

  /// Administrative delete. Not part of the lifecycle: removes the record
  /// whatever its status.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    if !self.store.delete(id).await.map_err(remote)? {
      return Err(Error::ResidentNotFound(id));
    }
    tracing::info!(resident_id = %id, "resident deleted by administrator");
    self.reload().await?;
    Ok(())
  }
}

/// Classify a backend error for the caller.
pub fn remote<E>(e: E) -> Error
where
  E: std::error::Error + RemoteFailure + Send + Sync + 'static,
{
  match e.failure_kind() {
    FailureKind::Network => Error::Network(Box::new(e)),
    FailureKind::Rejected => Error::RemoteRejected(Box::new(e)),
    FailureKind::Conflict => Error::Conflict(Box::new(e)),
  }
}
