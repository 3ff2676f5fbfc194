//! Shared fixtures for unit tests: resident builders and in-memory fakes of
//! every collaborator trait.

use std::{
  collections::VecDeque,
  sync::Mutex,
  time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use crate::{
  geo::ReverseGeocoder,
  media::ObjectStorage,
  resident::{NewResident, Resident},
  status::ResidentStatus,
  store::{ChangeEvent, FailureKind, RemoteFailure, ResidentFilter, ResidentStore},
  transition::MutationIntent,
};

pub fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

pub fn resident(last: &str, first: &str, status: ResidentStatus) -> Resident {
  let mut r = NewResident::new(Uuid::new_v4(), first, last)
    .into_resident(Uuid::new_v4(), at(1_000));
  r.status = status;
  if status.carries_reason() {
    r.rejection_reason = Some("needs work".into());
  }
  r
}

// ─── Record store ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("fake store failure ({0:?})")]
pub struct FakeError(pub FailureKind);

impl RemoteFailure for FakeError {
  fn failure_kind(&self) -> FailureKind { self.0 }
}

pub struct MemoryStore {
  rows:        Mutex<Vec<Resident>>,
  fail:        Mutex<Option<FailureKind>>,
  fail_fetch:  Mutex<Option<FailureKind>>,
  fail_update: Mutex<Option<FailureKind>>,
  gates:       Mutex<VecDeque<oneshot::Receiver<()>>>,
  updates:     Mutex<usize>,
  changes:     broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
  pub fn with(rows: Vec<Resident>) -> Self {
    Self {
      rows:        Mutex::new(rows),
      fail:        Mutex::new(None),
      fail_fetch:  Mutex::new(None),
      fail_update: Mutex::new(None),
      gates:       Mutex::new(VecDeque::new()),
      updates:     Mutex::new(0),
      changes:     broadcast::channel(16).0,
    }
  }

  /// Make the next store call fail with `kind`.
  pub fn fail_next(&self, kind: FailureKind) { *self.fail.lock().unwrap() = Some(kind); }

  /// Make the next `fetch_all` fail with `kind`; other calls go through.
  pub fn fail_next_fetch(&self, kind: FailureKind) {
    *self.fail_fetch.lock().unwrap() = Some(kind);
  }

  /// Make the next `update` fail with `kind`; other calls go through.
  pub fn fail_next_update(&self, kind: FailureKind) {
    *self.fail_update.lock().unwrap() = Some(kind);
  }

  /// Hold the next `fetch_all` (after it has read the rows) until `gate`
  /// fires.
  pub fn gate_next_fetch(&self, gate: oneshot::Receiver<()>) {
    self.gates.lock().unwrap().push_back(gate);
  }

  pub fn push(&self, resident: Resident) { self.rows.lock().unwrap().push(resident); }

  pub fn update_count(&self) -> usize { *self.updates.lock().unwrap() }

  fn check(&self) -> Result<(), FakeError> {
    match self.fail.lock().unwrap().take() {
      Some(kind) => Err(FakeError(kind)),
      None => Ok(()),
    }
  }
}

impl ResidentStore for MemoryStore {
  type Error = FakeError;

  async fn fetch_all(&self, filter: &ResidentFilter) -> Result<Vec<Resident>, FakeError> {
    self.check()?;
    if let Some(kind) = self.fail_fetch.lock().unwrap().take() {
      return Err(FakeError(kind));
    }
    let mut rows: Vec<Resident> = self
      .rows
      .lock()
      .unwrap()
      .iter()
      .filter(|r| filter.status.is_none_or(|s| r.status == s))
      .filter(|r| filter.account_id.is_none_or(|a| r.account_id == a))
      .cloned()
      .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let gate = self.gates.lock().unwrap().pop_front();
    if let Some(gate) = gate {
      let _ = gate.await;
    }
    Ok(rows)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Resident>, FakeError> {
    self.check()?;
    let rows = self.rows.lock().unwrap();
    Ok(rows.iter().find(|r| r.resident_id == id).cloned())
  }

  async fn insert(&self, input: NewResident) -> Result<Resident, FakeError> {
    self.check()?;
    let resident = input.into_resident(Uuid::new_v4(), Utc::now());
    self.rows.lock().unwrap().push(resident.clone());
    let _ = self.changes.send(ChangeEvent::Inserted(resident.resident_id));
    Ok(resident)
  }

  async fn update(&self, intent: &MutationIntent) -> Result<(), FakeError> {
    self.check()?;
    if let Some(kind) = self.fail_update.lock().unwrap().take() {
      return Err(FakeError(kind));
    }
    {
      let mut rows = self.rows.lock().unwrap();
      let row = rows
        .iter_mut()
        .find(|r| r.resident_id == intent.resident_id)
        .ok_or(FakeError(FailureKind::Rejected))?;
      intent.apply_to(row);
    }
    *self.updates.lock().unwrap() += 1;
    let _ = self.changes.send(ChangeEvent::Updated(intent.resident_id));
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<bool, FakeError> {
    self.check()?;
    let removed = {
      let mut rows = self.rows.lock().unwrap();
      let before = rows.len();
      rows.retain(|r| r.resident_id != id);
      rows.len() != before
    };
    if removed {
      let _ = self.changes.send(ChangeEvent::Deleted(id));
    }
    Ok(removed)
  }

  fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> { self.changes.subscribe() }
}

// ─── Object storage ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("storage offline")]
pub struct StorageOffline;

/// Signs by prefixing the path.
pub struct PrefixStorage;

impl ObjectStorage for PrefixStorage {
  type Error = StorageOffline;

  async fn put(&self, _path: &str, _data: &[u8]) -> Result<(), StorageOffline> { Ok(()) }

  async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageOffline> {
    Ok(format!("signed://{path}?ttl={}", ttl.as_secs()))
  }

  async fn delete(&self, _path: &str) -> Result<(), StorageOffline> { Ok(()) }
}

pub struct FailingStorage;

impl ObjectStorage for FailingStorage {
  type Error = StorageOffline;

  async fn put(&self, _path: &str, _data: &[u8]) -> Result<(), StorageOffline> {
    Err(StorageOffline)
  }

  async fn signed_url(&self, _path: &str, _ttl: Duration) -> Result<String, StorageOffline> {
    Err(StorageOffline)
  }

  async fn delete(&self, _path: &str) -> Result<(), StorageOffline> { Err(StorageOffline) }
}

// ─── Geocoder ────────────────────────────────────────────────────────────────

pub struct FixedGeocoder(pub String);

impl ReverseGeocoder for FixedGeocoder {
  type Error = StorageOffline;

  async fn resolve(&self, _lat: f64, _lng: f64) -> Result<String, StorageOffline> {
    Ok(self.0.clone())
  }
}

pub struct FailingGeocoder;

impl ReverseGeocoder for FailingGeocoder {
  type Error = StorageOffline;

  async fn resolve(&self, _lat: f64, _lng: f64) -> Result<String, StorageOffline> {
    Err(StorageOffline)
  }
}
