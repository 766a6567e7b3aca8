//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates plain ISO dates, UUIDs
//! hyphenated lowercase strings, and profile fields compact JSON objects.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{
  person::{Membership, PersonUser},
  unit::OrgUnit,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

// ─── Profile fields ──────────────────────────────────────────────────────────

pub fn encode_profile(fields: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `users` row as read from SQLite, before decoding.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub first_name:    String,
  pub last_name:     String,
  pub supervisor_id: Option<String>,
  pub created_at:    String,
}

impl RawUser {
  pub fn decode(self) -> Result<PersonUser> {
    Ok(PersonUser {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      first_name:    self.first_name,
      last_name:     self.last_name,
      supervisor_id: self
        .supervisor_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// An `org_units` row as read from SQLite.
pub struct RawUnit {
  pub unit_id:    String,
  pub name:       String,
  pub parent_id:  Option<String>,
  pub created_at: String,
}

impl RawUnit {
  pub fn decode(self) -> Result<OrgUnit> {
    Ok(OrgUnit {
      unit_id:    decode_uuid(&self.unit_id)?,
      name:       self.name,
      parent_id:  self.parent_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `memberships` row as read from SQLite.
pub struct RawMembership {
  pub membership_id:    String,
  pub user_id:          String,
  pub unit_id:          String,
  pub active:           bool,
  pub last_imported_at: String,
}

impl RawMembership {
  pub fn decode(self) -> Result<Membership> {
    Ok(Membership {
      membership_id:    decode_uuid(&self.membership_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      unit_id:          decode_uuid(&self.unit_id)?,
      active:           self.active,
      last_imported_at: decode_dt(&self.last_imported_at)?,
    })
  }
}
