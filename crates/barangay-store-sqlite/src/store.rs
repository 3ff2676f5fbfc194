//! [`SqliteStore`]: the SQLite implementation of [`ResidentStore`].

use std::path::Path;

use barangay_core::{
  resident::{NewResident, Resident},
  store::{ChangeEvent, ResidentFilter, ResidentStore},
  transition::MutationIntent,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RESIDENT_COLUMNS, RawResident, encode_date, encode_dt, encode_json, encode_media,
    encode_spouse, encode_uuid,
  },
  schema::SCHEMA,
};

/// Change events buffered per subscriber before it starts lagging.
const CHANGE_BUFFER: usize = 64;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A resident store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and change channel are
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    let (changes, _) = broadcast::channel(CHANGE_BUFFER);
    Ok(Self { conn, changes })
  }

  fn notify(&self, event: ChangeEvent) {
    // No subscribers is not an error.
    let _ = self.changes.send(event);
  }

  /// Insert a fully-built [`Resident`] into the `residents` table.
  ///
  /// Returns `false` without writing if the account already owns a record.
  async fn insert_row(&self, resident: &Resident) -> Result<bool> {
    let resident_id      = encode_uuid(resident.resident_id);
    let account_id       = encode_uuid(resident.account_id);
    let first_name       = resident.first_name.clone();
    let middle_name      = resident.middle_name.clone();
    let last_name        = resident.last_name.clone();
    let gender           = resident.gender.clone();
    let birth_date       = resident.birth_date.map(encode_date);
    let address          = encode_json(&resident.address)?;
    let contact          = encode_json(&resident.contact)?;
    let spouse           = resident.spouse.as_ref().map(encode_spouse).transpose()?;
    let household        = encode_json(&resident.household)?;
    let census           = encode_json(&resident.census)?;
    let profile_image    = encode_media(resident.profile_image.as_ref());
    let valid_id         = encode_media(resident.valid_id.as_ref());
    let zone_certificate = encode_media(resident.zone_certificate.as_ref());
    let latitude         = resident.location.map(|l| l.latitude);
    let longitude        = resident.location.map(|l| l.longitude);
    let status           = resident.status.code();
    let rejection_reason = resident.rejection_reason.clone();
    let created_at       = encode_dt(resident.created_at);
    let updated_at       = encode_dt(resident.updated_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM residents WHERE account_id = ?1",
            rusqlite::params![account_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO residents (
             resident_id, account_id, first_name, middle_name, last_name,
             gender, birth_date, address, contact, spouse, household, census,
             profile_image, valid_id, zone_certificate, latitude, longitude,
             status, rejection_reason, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
          rusqlite::params![
            resident_id,
            account_id,
            first_name,
            middle_name,
            last_name,
            gender,
            birth_date,
            address,
            contact,
            spouse,
            household,
            census,
            profile_image,
            valid_id,
            zone_certificate,
            latitude,
            longitude,
            status,
            rejection_reason,
            created_at,
            updated_at,
          ],
        )?;
        Ok(true)
      })
      .await?;
    Ok(inserted)
  }
}

// ─── ResidentStore impl ──────────────────────────────────────────────────────

impl ResidentStore for SqliteStore {
  type Error = Error;

  async fn fetch_all(&self, filter: &ResidentFilter) -> Result<Vec<Resident>> {
    let status_code = filter.status.map(|s| s.code());
    let account_str = filter.account_id.map(encode_uuid);

    let raws: Vec<RawResident> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; unused parameters bind as NULL.
        let mut conds: Vec<&'static str> = vec![];
        if status_code.is_some() {
          conds.push("status = ?1");
        }
        if account_str.is_some() {
          conds.push("account_id = ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        // Newest first; rowid breaks ties between identical timestamps.
        let sql = format!(
          "SELECT {RESIDENT_COLUMNS}
           FROM residents
           {where_clause}
           ORDER BY created_at DESC, rowid DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let bound = stmt.parameter_count();
        let params: Vec<&dyn rusqlite::ToSql> = [
          &status_code as &dyn rusqlite::ToSql,
          &account_str as &dyn rusqlite::ToSql,
        ]
        .into_iter()
        .take(bound)
        .collect();
        let rows = stmt
          .query_map(params.as_slice(), RawResident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResident::into_resident).collect()
  }

  async fn get(&self, id: Uuid) -> Result<Option<Resident>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawResident> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {RESIDENT_COLUMNS} FROM residents WHERE resident_id = ?1"),
            rusqlite::params![id_str],
            RawResident::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawResident::into_resident).transpose()
  }

  async fn insert(&self, input: NewResident) -> Result<Resident> {
    let account_id = input.account_id;
    let resident = input.into_resident(Uuid::new_v4(), Utc::now());

    if !self.insert_row(&resident).await? {
      return Err(Error::DuplicateAccount(account_id));
    }

    tracing::debug!(resident_id = %resident.resident_id, "resident row inserted");
    self.notify(ChangeEvent::Inserted(resident.resident_id));
    Ok(resident)
  }

  async fn update(&self, intent: &MutationIntent) -> Result<()> {
    let id         = intent.resident_id;
    let id_str     = encode_uuid(id);
    let status     = intent.status.code();
    let reason     = intent.rejection_reason.clone();
    let updated_at = encode_dt(intent.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE residents
           SET status = ?1, rejection_reason = ?2, updated_at = ?3
           WHERE resident_id = ?4",
          rusqlite::params![status, reason, updated_at, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ResidentNotFound(id));
    }

    tracing::debug!(resident_id = %id, status = intent.status.code(), "resident row updated");
    self.notify(ChangeEvent::Updated(id));
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM residents WHERE resident_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Ok(false);
    }
    self.notify(ChangeEvent::Deleted(id));
    Ok(true)
  }

  fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> { self.changes.subscribe() }
}

impl SqliteStore {
  /// Write a raw status code, bypassing every check. Test-only: used to
  /// exercise decoding of corrupt rows.
  #[cfg(test)]
  pub(crate) async fn force_status_code(&self, id: Uuid, code: i64) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE residents SET status = ?1 WHERE resident_id = ?2",
          rusqlite::params![code, id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
