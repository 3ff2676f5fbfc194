//! Integration tests for `SqliteStore` against an in-memory database.

use std::{sync::Arc, time::Duration};

use barangay_core::{
  geo::Location,
  media::MediaRef,
  resident::{Census, HouseholdMember, NewResident, Spouse},
  status::ResidentStatus,
  store::{ChangeEvent, FailureKind, RemoteFailure, ResidentFilter, ResidentStore},
  sync::SyncAdapter,
  transition::{self, TransitionCommand, UpdateChannel},
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn submission(first: &str, last: &str) -> NewResident {
  NewResident::new(Uuid::new_v4(), first, last)
}

fn full_submission() -> NewResident {
  let mut input = submission("Juan", "Dela Cruz");
  input.middle_name = Some("Santos".into());
  input.gender = "male".into();
  input.birth_date = NaiveDate::from_ymd_opt(1990, 4, 12);
  input.address.barangay = "San Roque".into();
  input.address.zone = "Zone 4".into();
  input.contact.phone = Some("+639171234567".into());
  input.spouse = Some(Spouse {
    name:       "Maria Dela Cruz".into(),
    occupation: Some("teacher".into()),
    valid_id:   Some(MediaRef::new("ids/spouse.png")),
  });
  input.household.members = vec![
    HouseholdMember {
      name:       "Pedro".into(),
      relation:   "Son".into(),
      birth_date: NaiveDate::from_ymd_opt(2015, 1, 2),
    },
    HouseholdMember {
      name:       "Lola".into(),
      relation:   "Mother".into(),
      birth_date: None,
    },
  ];
  input.census = Census {
    home_ownership:   Some("owned".into()),
    is_renting:       Some(false),
    has_electricity:  Some(true),
    has_water_supply: Some(true),
    registered_voter: Some(true),
  };
  input.profile_image = Some(MediaRef::new("profiles/juan.png"));
  input.valid_id = Some(MediaRef::new("ids/juan.png"));
  input.location = Some(Location {
    latitude:  14.6507,
    longitude: 121.0494,
  });
  input
}

// ─── Insert & read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_round_trips_every_section() {
  let s = store().await;
  let inserted = s.insert(full_submission()).await.unwrap();
  assert_eq!(inserted.status, ResidentStatus::Pending);
  assert_eq!(inserted.created_at, inserted.updated_at);

  let fetched = s.get(inserted.resident_id).await.unwrap().unwrap();
  assert_eq!(fetched.first_name, "Juan");
  assert_eq!(fetched.address.zone, "Zone 4");
  assert_eq!(fetched.household.children(), 1);
  assert_eq!(fetched.census.is_renting, Some(false));
  assert_eq!(fetched.spouse.unwrap().valid_id.unwrap().path, "ids/spouse.png");
  assert_eq!(fetched.profile_image.unwrap().path, "profiles/juan.png");
  assert!(fetched.zone_certificate.is_none());
  assert_eq!(fetched.location.unwrap().latitude, 14.6507);
  // Sub-second precision survives the round trip.
  assert_eq!(fetched.created_at, inserted.created_at);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn one_record_per_account() {
  let s = store().await;
  let first = submission("Ana", "Reyes");
  let mut second = submission("Ana", "Reyes");
  second.account_id = first.account_id;

  s.insert(first).await.unwrap();
  let err = s.insert(second).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateAccount(_)));
  assert_eq!(err.failure_kind(), FailureKind::Conflict);
}

#[tokio::test]
async fn fetch_all_is_newest_first() {
  let s = store().await;
  let a = s.insert(submission("A", "First")).await.unwrap();
  tokio::time::sleep(Duration::from_millis(2)).await;
  let b = s.insert(submission("B", "Second")).await.unwrap();
  tokio::time::sleep(Duration::from_millis(2)).await;
  let c = s.insert(submission("C", "Third")).await.unwrap();

  let ids: Vec<Uuid> = s
    .fetch_all(&ResidentFilter::default())
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.resident_id)
    .collect();
  assert_eq!(ids, vec![c.resident_id, b.resident_id, a.resident_id]);
}

#[tokio::test]
async fn fetch_all_filters_by_status_and_account() {
  let s = store().await;
  let a = s.insert(submission("A", "a")).await.unwrap();
  let b = s.insert(submission("B", "b")).await.unwrap();
  s.update(&transition::approve(&b, Utc::now()).unwrap())
    .await
    .unwrap();

  let pending = s
    .fetch_all(&ResidentFilter {
      status:     Some(ResidentStatus::Pending),
      account_id: None,
    })
    .await
    .unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].resident_id, a.resident_id);

  let by_account = s
    .fetch_all(&ResidentFilter {
      status:     None,
      account_id: Some(b.account_id),
    })
    .await
    .unwrap();
  assert_eq!(by_account.len(), 1);
  assert_eq!(by_account[0].status, ResidentStatus::Approved);

  let both = s
    .fetch_all(&ResidentFilter {
      status:     Some(ResidentStatus::Pending),
      account_id: Some(b.account_id),
    })
    .await
    .unwrap();
  assert!(both.is_empty());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_touches_only_the_intent_fields() {
  let s = store().await;
  let original = s.insert(full_submission()).await.unwrap();

  let intent =
    transition::reject(&original, "Incomplete household composition", Utc::now())
      .unwrap();
  s.update(&intent).await.unwrap();

  let stored = s.get(original.resident_id).await.unwrap().unwrap();
  let mut expected = original.clone();
  intent.apply_to(&mut expected);
  assert_eq!(stored, expected);
  assert!(stored.updated_at > original.updated_at);
}

#[tokio::test]
async fn approve_clears_a_stored_reason() {
  let s = store().await;
  let r = s.insert(submission("A", "a")).await.unwrap();
  s.update(&transition::approve(&r, Utc::now()).unwrap())
    .await
    .unwrap();
  let approved = s.get(r.resident_id).await.unwrap().unwrap();
  s.update(
    &transition::request_update(&approved, "Re-profile", UpdateChannel::Profiling, Utc::now())
      .unwrap(),
  )
  .await
  .unwrap();
  let needs_update = s.get(r.resident_id).await.unwrap().unwrap();
  assert_eq!(needs_update.rejection_reason.as_deref(), Some("Re-profile"));

  s.update(&transition::approve(&needs_update, Utc::now()).unwrap())
    .await
    .unwrap();
  let done = s.get(r.resident_id).await.unwrap().unwrap();
  assert_eq!(done.status, ResidentStatus::UpdateApproved);
  assert!(done.rejection_reason.is_none());
}

#[tokio::test]
async fn update_missing_resident_is_rejected() {
  let s = store().await;
  let ghost = submission("G", "g").into_resident(Uuid::new_v4(), Utc::now());
  let intent = transition::approve(&ghost, Utc::now()).unwrap();
  let err = s.update(&intent).await.unwrap_err();
  assert!(matches!(err, Error::ResidentNotFound(id) if id == ghost.resident_id));
  assert_eq!(err.failure_kind(), FailureKind::Rejected);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_row() {
  let s = store().await;
  let r = s.insert(submission("A", "a")).await.unwrap();
  assert!(s.delete(r.resident_id).await.unwrap());
  assert!(s.get(r.resident_id).await.unwrap().is_none());
  assert!(!s.delete(r.resident_id).await.unwrap());
}

// ─── Storage boundary ────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_status_code_is_rejected_on_read() {
  let s = store().await;
  let r = s.insert(submission("A", "a")).await.unwrap();
  s.force_status_code(r.resident_id, 9).await.unwrap();

  let err = s.get(r.resident_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(barangay_core::Error::UnknownStatusCode(9))
  ));
  assert!(s.fetch_all(&ResidentFilter::default()).await.is_err());
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_are_broadcast() {
  let s = store().await;
  let mut rx = s.subscribe();

  let r = s.insert(submission("A", "a")).await.unwrap();
  s.update(&transition::approve(&r, Utc::now()).unwrap())
    .await
    .unwrap();
  s.delete(r.resident_id).await.unwrap();
  // A miss is not broadcast.
  s.delete(r.resident_id).await.unwrap();

  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Inserted(r.resident_id));
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Updated(r.resident_id));
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Deleted(r.resident_id));
  assert!(rx.try_recv().is_err());
}

// ─── With the sync adapter ───────────────────────────────────────────────────

#[tokio::test]
async fn adapter_reject_scenario_over_sqlite() {
  let s = Arc::new(store().await);
  let adapter = SyncAdapter::new(s.clone());

  let submitted = adapter.submit(full_submission()).await.unwrap();
  assert_eq!(submitted.status, ResidentStatus::Pending);

  adapter
    .transition(submitted.resident_id, &TransitionCommand::Reject {
      reason: "Incomplete household composition".into(),
    })
    .await
    .unwrap();

  let seen = adapter.resident(submitted.resident_id).await.unwrap();
  assert_eq!(seen.status, ResidentStatus::Rejected);
  assert_eq!(
    seen.rejection_reason.as_deref(),
    Some("Incomplete household composition")
  );
  assert_eq!(seen.household, submitted.household);
  assert_eq!(seen.census, submitted.census);

  // Rejection is one-way.
  let err = adapter
    .transition(submitted.resident_id, &TransitionCommand::Approve)
    .await
    .unwrap_err();
  assert!(matches!(err, barangay_core::Error::IllegalTransition { .. }));
}
