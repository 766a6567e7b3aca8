//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use uuid::Uuid;

use rollcall_core::{
  person::{Membership, PersonUser, UserUpsert},
  record::{NormalizedRecord, SupervisorContact, validate_email},
  store::RosterStore,
  unit::{OrgUnit, UnitUpsert},
};

use crate::{
  Error, Result,
  encode::{
    RawMembership, RawUnit, RawUser, encode_date, encode_dt, encode_profile,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall roster store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted, so a batch
/// run and the HTTP read endpoints share one store.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Flag a membership as operator-curated: imports will still see the row
  /// but decline to manage (or report) it.
  pub async fn set_membership_sync_excluded(
    &self,
    user_id: Uuid,
    unit_id: Uuid,
    excluded: bool,
  ) -> Result<()> {
    let membership_id = encode_uuid(Uuid::new_v4());
    let user_id = encode_uuid(user_id);
    let unit_id = encode_uuid(unit_id);
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO memberships
             (membership_id, user_id, unit_id, active, sync_excluded, last_imported_at)
           VALUES (?1, ?2, ?3, 0, ?4, ?5)
           ON CONFLICT(user_id, unit_id)
             DO UPDATE SET sync_excluded = excluded.sync_excluded",
          params![membership_id, user_id, unit_id, excluded, now],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_user(
    &self,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    entry_date: Option<String>,
    exit_date: Option<String>,
    profile_json: Option<String>,
  ) -> Result<UserUpsert> {
    let now = encode_dt(Utc::now());

    let (raw, created) = self
      .conn
      .call(move |conn| {
        let existing: Option<String> = conn
          .query_row(
            "SELECT user_id FROM users WHERE email = ?1",
            params![email],
            |r| r.get(0),
          )
          .optional()?;

        match existing {
          Some(user_id) => {
            conn.execute(
              "UPDATE users SET
                 first_name   = coalesce(?2, first_name),
                 last_name    = coalesce(?3, last_name),
                 entry_date   = coalesce(?4, entry_date),
                 exit_date    = coalesce(?5, exit_date),
                 profile_json = coalesce(?6, profile_json),
                 updated_at   = ?7
               WHERE user_id = ?1",
              params![
                user_id, first_name, last_name, entry_date, exit_date,
                profile_json, now
              ],
            )?;
            Ok((fetch_user(conn, &user_id)?, false))
          }
          None => {
            let user_id = encode_uuid(Uuid::new_v4());
            conn.execute(
              "INSERT INTO users
                 (user_id, email, first_name, last_name, entry_date,
                  exit_date, profile_json, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, coalesce(?7, '{}'), ?8, ?8)",
              params![
                user_id, email,
                first_name.unwrap_or_default(),
                last_name.unwrap_or_default(),
                entry_date, exit_date, profile_json, now
              ],
            )?;
            Ok((fetch_user(conn, &user_id)?, true))
          }
        }
      })
      .await?;

    Ok(UserUpsert {
      user: raw.decode()?,
      created,
    })
  }
}

/// Read one user row by id. Callers guarantee existence.
fn fetch_user(
  conn: &rusqlite::Connection,
  user_id: &str,
) -> rusqlite::Result<RawUser> {
  conn.query_row(
    "SELECT user_id, email, first_name, last_name, supervisor_id, created_at
     FROM users WHERE user_id = ?1",
    params![user_id],
    |r| {
      Ok(RawUser {
        user_id:       r.get(0)?,
        email:         r.get(1)?,
        first_name:    r.get(2)?,
        last_name:     r.get(3)?,
        supervisor_id: r.get(4)?,
        created_at:    r.get(5)?,
      })
    },
  )
}

fn user_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:       r.get(0)?,
    email:         r.get(1)?,
    first_name:    r.get(2)?,
    last_name:     r.get(3)?,
    supervisor_id: r.get(4)?,
    created_at:    r.get(5)?,
  })
}

fn unit_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawUnit> {
  Ok(RawUnit {
    unit_id:    r.get(0)?,
    name:       r.get(1)?,
    parent_id:  r.get(2)?,
    created_at: r.get(3)?,
  })
}

// ─── Trait implementation ────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  async fn update_or_create_user(
    &self,
    record: &NormalizedRecord,
  ) -> Result<UserUpsert> {
    let email = validate_email(&record.email)
      .map_err(Error::Core)?
      .to_lowercase();
    self
      .upsert_user(
        email,
        Some(record.first_name.clone()),
        Some(record.last_name.clone()),
        record.entry_date.map(encode_date),
        record.exit_date.map(encode_date),
        Some(encode_profile(&record.profile_fields)?),
      )
      .await
  }

  async fn update_or_create_supervisor(
    &self,
    contact: &SupervisorContact,
  ) -> Result<UserUpsert> {
    let email = validate_email(contact.email.as_deref().unwrap_or_default())
      .map_err(Error::Core)?
      .to_lowercase();
    self
      .upsert_user(
        email,
        contact.first_name.clone(),
        contact.last_name.clone(),
        None,
        None,
        None,
      )
      .await
  }

  async fn set_supervisor(
    &self,
    user_id: Uuid,
    supervisor_id: Uuid,
  ) -> Result<()> {
    let user = encode_uuid(user_id);
    let supervisor = encode_uuid(supervisor_id);
    let now = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET supervisor_id = ?2, updated_at = ?3
           WHERE user_id = ?1",
          params![user, supervisor, now],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(())
  }

  async fn find_user_by_email(
    &self,
    email: &str,
  ) -> Result<Option<PersonUser>> {
    let email = email.trim().to_lowercase();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, first_name, last_name, supervisor_id,
                      created_at
               FROM users WHERE email = ?1",
              params![email],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::decode).transpose()
  }

  async fn list_users(&self) -> Result<Vec<PersonUser>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, email, first_name, last_name, supervisor_id,
                  created_at
           FROM users ORDER BY email",
        )?;
        let rows = stmt
          .query_map([], user_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    rows.into_iter().map(RawUser::decode).collect()
  }

  async fn create_or_reuse_unit(
    &self,
    name: &str,
    parent_id: Option<Uuid>,
  ) -> Result<UnitUpsert> {
    let name = name.trim().to_string();
    if name.is_empty() {
      return Err(Error::Core(rollcall_core::Error::EmptyUnitName));
    }
    let parent = parent_id.map(encode_uuid);
    let now = encode_dt(Utc::now());

    let (raw, created) = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT unit_id, name, parent_id, created_at
             FROM org_units WHERE name = ?1 AND parent_id IS ?2",
            params![name, parent],
            unit_from_row,
          )
          .optional()?;

        if let Some(raw) = existing {
          return Ok((raw, false));
        }

        let unit_id = encode_uuid(Uuid::new_v4());
        conn.execute(
          "INSERT INTO org_units (unit_id, name, parent_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![unit_id, name, parent, now],
        )?;
        Ok((
          RawUnit {
            unit_id,
            name,
            parent_id: parent,
            created_at: now,
          },
          true,
        ))
      })
      .await?;

    Ok(UnitUpsert {
      unit: raw.decode()?,
      created,
    })
  }

  async fn get_unit(&self, unit_id: Uuid) -> Result<Option<OrgUnit>> {
    let id = encode_uuid(unit_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT unit_id, name, parent_id, created_at
               FROM org_units WHERE unit_id = ?1",
              params![id],
              unit_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUnit::decode).transpose()
  }

  async fn list_units(&self) -> Result<Vec<OrgUnit>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT unit_id, name, parent_id, created_at
           FROM org_units ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], unit_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    rows.into_iter().map(RawUnit::decode).collect()
  }

  async fn update_or_create_membership(
    &self,
    user_id: Uuid,
    unit_id: Uuid,
  ) -> Result<Option<Membership>> {
    let user = encode_uuid(user_id);
    let unit = encode_uuid(unit_id);
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let existing: Option<(String, bool)> = conn
          .query_row(
            "SELECT membership_id, sync_excluded FROM memberships
             WHERE user_id = ?1 AND unit_id = ?2",
            params![user, unit],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let membership_id = match existing {
          Some((_, true)) => return Ok(None),
          Some((membership_id, false)) => {
            conn.execute(
              "UPDATE memberships SET active = 1, last_imported_at = ?2
               WHERE membership_id = ?1",
              params![membership_id, now],
            )?;
            membership_id
          }
          None => {
            let membership_id = encode_uuid(Uuid::new_v4());
            conn.execute(
              "INSERT INTO memberships
                 (membership_id, user_id, unit_id, active, sync_excluded,
                  last_imported_at)
               VALUES (?1, ?2, ?3, 1, 0, ?4)",
              params![membership_id, user, unit, now],
            )?;
            membership_id
          }
        };

        Ok(Some(RawMembership {
          membership_id,
          user_id: user,
          unit_id: unit,
          active: true,
          last_imported_at: now,
        }))
      })
      .await?;

    raw.map(RawMembership::decode).transpose()
  }
}
