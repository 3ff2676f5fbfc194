//! Resident records: the entity tracked through the vetting workflow.
//!
//! Personal and household data is written once by the submission flow and is
//! never touched by status transitions. Only `status`, `rejection_reason` and
//! `updated_at` change afterwards (see [`crate::transition`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{geo::Location, media::MediaRef, status::ResidentStatus};

// ─── Address & contact ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub region:   String,
  pub province: String,
  pub city:     String,
  pub barangay: String,
  /// Purok / zone within the barangay.
  pub zone:     String,
  pub zip:      String,
}

impl Address {
  /// All components, in the order they are searched.
  pub fn components(&self) -> [&str; 6] {
    [
      &self.region,
      &self.province,
      &self.city,
      &self.barangay,
      &self.zone,
      &self.zip,
    ]
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub phone: Option<String>,
  pub email: Option<String>,
}

// ─── Household ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spouse {
  pub name:       String,
  pub occupation: Option<String>,
  pub valid_id:   Option<MediaRef>,
}

/// One member of the household, in the order the resident listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdMember {
  pub name:       String,
  /// Free text relation to the resident, e.g. "Son", "Daughter", "Mother".
  pub relation:   String,
  pub birth_date: Option<NaiveDate>,
}

impl HouseholdMember {
  pub fn is_child(&self) -> bool {
    let relation = self.relation.trim();
    relation.eq_ignore_ascii_case("son")
      || relation.eq_ignore_ascii_case("daughter")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Household {
  pub members: Vec<HouseholdMember>,
}

impl Household {
  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }

  /// Members tagged as a son or daughter.
  pub fn children(&self) -> usize {
    self.members.iter().filter(|m| m.is_child()).count()
  }
}

/// Census answers collected at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
  /// e.g. "owned", "shared", "informal settler".
  pub home_ownership:   Option<String>,
  /// `None` when the resident skipped the question.
  pub is_renting:       Option<bool>,
  pub has_electricity:  Option<bool>,
  pub has_water_supply: Option<bool>,
  pub registered_voter: Option<bool>,
}

// ─── Resident ────────────────────────────────────────────────────────────────

/// A resident record as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
  pub resident_id:      Uuid,
  /// The account that submitted this record. One record per account.
  pub account_id:       Uuid,
  pub first_name:       String,
  pub middle_name:      Option<String>,
  pub last_name:        String,
  pub gender:           String,
  pub birth_date:       Option<NaiveDate>,
  pub address:          Address,
  pub contact:          Contact,
  pub spouse:           Option<Spouse>,
  pub household:        Household,
  pub census:           Census,
  pub profile_image:    Option<MediaRef>,
  pub valid_id:         Option<MediaRef>,
  pub zone_certificate: Option<MediaRef>,
  pub location:         Option<Location>,
  pub status:           ResidentStatus,
  /// Only meaningful while [`ResidentStatus::carries_reason`] holds.
  pub rejection_reason: Option<String>,
  /// Set once, at submission.
  pub created_at:       DateTime<Utc>,
  /// Set on every status-changing mutation.
  pub updated_at:       DateTime<Utc>,
}

impl Resident {
  /// "Last, First Middle" as shown in the admin list.
  pub fn display_name(&self) -> String {
    match self.middle_name.as_deref().filter(|m| !m.trim().is_empty()) {
      Some(middle) => {
        format!("{}, {} {}", self.last_name, self.first_name, middle)
      }
      None => format!("{}, {}", self.last_name, self.first_name),
    }
  }

  /// The rejection reason, if the current status gives it meaning.
  pub fn active_reason(&self) -> Option<&str> {
    if self.status.carries_reason() {
      self.rejection_reason.as_deref()
    } else {
      None
    }
  }

  /// Every media reference on the record, labelled by slot.
  pub fn media_refs_mut(&mut self) -> Vec<(&'static str, &mut MediaRef)> {
    let mut refs = Vec::new();
    if let Some(m) = self.profile_image.as_mut() {
      refs.push(("profile_image", m));
    }
    if let Some(m) = self.valid_id.as_mut() {
      refs.push(("valid_id", m));
    }
    if let Some(m) = self.zone_certificate.as_mut() {
      refs.push(("zone_certificate", m));
    }
    if let Some(m) = self.spouse.as_mut().and_then(|s| s.valid_id.as_mut()) {
      refs.push(("spouse_valid_id", m));
    }
    refs
  }
}

// ─── NewResident ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::ResidentStore::insert`].
///
/// The store assigns `resident_id`, sets `created_at = updated_at = now`,
/// starts the record in [`ResidentStatus::Pending`] and leaves the rejection
/// reason empty; none of these are accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResident {
  pub account_id:       Uuid,
  pub first_name:       String,
  #[serde(default)]
  pub middle_name:      Option<String>,
  pub last_name:        String,
  pub gender:           String,
  #[serde(default)]
  pub birth_date:       Option<NaiveDate>,
  #[serde(default)]
  pub address:          Address,
  #[serde(default)]
  pub contact:          Contact,
  #[serde(default)]
  pub spouse:           Option<Spouse>,
  #[serde(default)]
  pub household:        Household,
  #[serde(default)]
  pub census:           Census,
  #[serde(default)]
  pub profile_image:    Option<MediaRef>,
  #[serde(default)]
  pub valid_id:         Option<MediaRef>,
  #[serde(default)]
  pub zone_certificate: Option<MediaRef>,
  #[serde(default)]
  pub location:         Option<Location>,
}

impl NewResident {
  /// Convenience constructor with every optional section empty.
  pub fn new(
    account_id: Uuid,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
  ) -> Self {
    Self {
      account_id,
      first_name: first_name.into(),
      middle_name: None,
      last_name: last_name.into(),
      gender: String::new(),
      birth_date: None,
      address: Address::default(),
      contact: Contact::default(),
      spouse: None,
      household: Household::default(),
      census: Census::default(),
      profile_image: None,
      valid_id: None,
      zone_certificate: None,
      location: None,
    }
  }

  /// Materialise the stored record for a fresh submission.
  pub fn into_resident(self, resident_id: Uuid, now: DateTime<Utc>) -> Resident {
    Resident {
      resident_id,
      account_id: self.account_id,
      first_name: self.first_name,
      middle_name: self.middle_name,
      last_name: self.last_name,
      gender: self.gender,
      birth_date: self.birth_date,
      address: self.address,
      contact: self.contact,
      spouse: self.spouse,
      household: self.household,
      census: self.census,
      profile_image: self.profile_image,
      valid_id: self.valid_id,
      zone_certificate: self.zone_certificate,
      location: self.location,
      status: ResidentStatus::Pending,
      rejection_reason: None,
      created_at: now,
      updated_at: now,
    }
  }
}
