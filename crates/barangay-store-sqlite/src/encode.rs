//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they sort
//! lexically. Nested sections (address, contact, spouse, household, census)
//! are stored as compact JSON. Media references store only their path.

use barangay_core::{
  geo::Location,
  media::MediaRef,
  resident::{Resident, Spouse},
  status::ResidentStatus,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── JSON sections ───────────────────────────────────────────────────────────

pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

/// Spouse section with its resolved URL stripped.
pub fn encode_spouse(spouse: &Spouse) -> Result<String> {
  let mut spouse = spouse.clone();
  if let Some(valid_id) = spouse.valid_id.as_mut() {
    valid_id.url = None;
  }
  encode_json(&spouse)
}

// ─── Media ───────────────────────────────────────────────────────────────────

pub fn encode_media(media: Option<&MediaRef>) -> Option<String> {
  media.map(|m| m.path.clone())
}

pub fn decode_media(path: Option<String>) -> Option<MediaRef> { path.map(MediaRef::new) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that feeds [`RawResident`].
pub const RESIDENT_COLUMNS: &str = "resident_id, account_id, first_name, middle_name, \
   last_name, gender, birth_date, address, contact, spouse, household, census, \
   profile_image, valid_id, zone_certificate, latitude, longitude, status, \
   rejection_reason, created_at, updated_at";

/// Raw values read directly from a `residents` row.
pub struct RawResident {
  pub resident_id:      String,
  pub account_id:       String,
  pub first_name:       String,
  pub middle_name:      Option<String>,
  pub last_name:        String,
  pub gender:           String,
  pub birth_date:       Option<String>,
  pub address:          String,
  pub contact:          String,
  pub spouse:           Option<String>,
  pub household:        String,
  pub census:           String,
  pub profile_image:    Option<String>,
  pub valid_id:         Option<String>,
  pub zone_certificate: Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub status:           i64,
  pub rejection_reason: Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawResident {
  /// Map a row selected with [`RESIDENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resident_id:      row.get(0)?,
      account_id:       row.get(1)?,
      first_name:       row.get(2)?,
      middle_name:      row.get(3)?,
      last_name:        row.get(4)?,
      gender:           row.get(5)?,
      birth_date:       row.get(6)?,
      address:          row.get(7)?,
      contact:          row.get(8)?,
      spouse:           row.get(9)?,
      household:        row.get(10)?,
      census:           row.get(11)?,
      profile_image:    row.get(12)?,
      valid_id:         row.get(13)?,
      zone_certificate: row.get(14)?,
      latitude:         row.get(15)?,
      longitude:        row.get(16)?,
      status:           row.get(17)?,
      rejection_reason: row.get(18)?,
      created_at:       row.get(19)?,
      updated_at:       row.get(20)?,
    })
  }

  pub fn into_resident(self) -> Result<Resident> {
    let location = match (self.latitude, self.longitude) {
      (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
      _ => None,
    };

    Ok(Resident {
      resident_id:      decode_uuid(&self.resident_id)?,
      account_id:       decode_uuid(&self.account_id)?,
      first_name:       self.first_name,
      middle_name:      self.middle_name,
      last_name:        self.last_name,
      gender:           self.gender,
      birth_date:       self.birth_date.as_deref().map(decode_date).transpose()?,
      address:          decode_json(&self.address)?,
      contact:          decode_json(&self.contact)?,
      spouse:           self.spouse.as_deref().map(decode_json).transpose()?,
      household:        decode_json(&self.household)?,
      census:           decode_json(&self.census)?,
      profile_image:    decode_media(self.profile_image),
      valid_id:         decode_media(self.valid_id),
      zone_certificate: decode_media(self.zone_certificate),
      location,
      status:           ResidentStatus::from_code(self.status)?,
      rejection_reason: self.rejection_reason,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}
