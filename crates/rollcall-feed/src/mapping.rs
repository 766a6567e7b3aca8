//! The field mapper: an admin-configured translation table from logical
//! roles to external field names, and the pure function that applies it.
//!
//! Feed adapters reduce their variant-specific shape to a flat
//! `field name → value` view; this module turns that view into a
//! [`NormalizedRecord`]. No side effects anywhere in this file.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rollcall_core::record::{NormalizedRecord, SupervisorContact};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─── Logical fields ──────────────────────────────────────────────────────────

/// The canonical roles a raw field can be mapped to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
  Email,
  FirstName,
  LastName,
  OrgUnit,
  SupervisorEmail,
  SupervisorFirstName,
  SupervisorLastName,
  EntryDate,
  ExitDate,
}

impl LogicalField {
  fn as_str(self) -> &'static str {
    match self {
      LogicalField::Email => "email",
      LogicalField::FirstName => "first_name",
      LogicalField::LastName => "last_name",
      LogicalField::OrgUnit => "org_unit",
      LogicalField::SupervisorEmail => "supervisor_email",
      LogicalField::SupervisorFirstName => "supervisor_first_name",
      LogicalField::SupervisorLastName => "supervisor_last_name",
      LogicalField::EntryDate => "entry_date",
      LogicalField::ExitDate => "exit_date",
    }
  }
}

impl fmt::Display for LogicalField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Translation table ───────────────────────────────────────────────────────

/// Per-deployment mapping from logical role to external field name.
///
/// Deserialized straight from configuration, e.g.
/// `{ "org_unit": "Organisation", "supervisor_email": "Manager_Email" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<LogicalField, String>);

impl FieldMap {
  /// An empty table; every lookup fails until sources are configured.
  pub fn empty() -> FieldMap { FieldMap(BTreeMap::new()) }

  /// Configure `field` to be read from the raw field named `source`.
  pub fn with(
    mut self,
    field: LogicalField,
    source: impl Into<String>,
  ) -> FieldMap {
    self.0.insert(field, source.into());
    self
  }

  /// The configured source for `field`, if any.
  pub fn get(&self, field: LogicalField) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  /// The configured source for `field`; missing configuration for a
  /// required field is the mapper's only fatal condition.
  pub fn source(&self, field: LogicalField) -> Result<&str> {
    self.get(field).ok_or(Error::MissingFieldMapping(field))
  }

  fn is_source(&self, raw_name: &str) -> bool {
    self.0.values().any(|s| s == raw_name)
  }
}

impl Default for FieldMap {
  /// Field names of the structured roster feed.
  fn default() -> FieldMap {
    FieldMap::empty()
      .with(LogicalField::Email, "Email")
      .with(LogicalField::FirstName, "Firstname")
      .with(LogicalField::LastName, "Lastname")
      .with(LogicalField::OrgUnit, "Organisation")
      .with(LogicalField::SupervisorEmail, "Manager_Email")
      .with(LogicalField::SupervisorFirstName, "Manager_Firstname")
      .with(LogicalField::SupervisorLastName, "Manager_Lastname")
      .with(LogicalField::EntryDate, "EntryDate")
      .with(LogicalField::ExitDate, "ExitDate")
  }
}

// ─── Mapper ──────────────────────────────────────────────────────────────────

/// Apply the translation table to a flat field view of one record.
///
/// Raw fields with no configured role are carried through as custom profile
/// fields on the normalized record.
pub fn map(
  raw: &BTreeMap<String, String>,
  fields: &FieldMap,
) -> Result<NormalizedRecord> {
  let email = required_value(raw, fields, LogicalField::Email)?;
  let org_path = required_value(raw, fields, LogicalField::OrgUnit)?;

  let mut record = NormalizedRecord::new(email, org_path);

  if let Some(v) = optional_value(raw, fields, LogicalField::FirstName) {
    record.first_name = v.to_string();
  }
  if let Some(v) = optional_value(raw, fields, LogicalField::LastName) {
    record.last_name = v.to_string();
  }

  record.supervisor = SupervisorContact {
    email:      optional_value(raw, fields, LogicalField::SupervisorEmail)
      .map(str::to_string),
    first_name: optional_value(raw, fields, LogicalField::SupervisorFirstName)
      .map(str::to_string),
    last_name:  optional_value(raw, fields, LogicalField::SupervisorLastName)
      .map(str::to_string),
  };

  record.entry_date = date_value(raw, fields, LogicalField::EntryDate)?;
  record.exit_date = date_value(raw, fields, LogicalField::ExitDate)?;

  record.profile_fields = raw
    .iter()
    .filter(|(name, _)| !fields.is_source(name))
    .map(|(name, value)| (name.clone(), value.clone()))
    .collect();

  Ok(record)
}

fn required_value<'a>(
  raw: &'a BTreeMap<String, String>,
  fields: &FieldMap,
  field: LogicalField,
) -> Result<&'a str> {
  let source = fields.source(field)?;
  raw
    .get(source)
    .map(String::as_str)
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or_else(|| Error::MissingValue {
      field: source.to_string(),
    })
}

fn optional_value<'a>(
  raw: &'a BTreeMap<String, String>,
  fields: &FieldMap,
  field: LogicalField,
) -> Option<&'a str> {
  let source = fields.get(field)?;
  raw
    .get(source)
    .map(String::as_str)
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

/// Parse an optional date field. Observed feeds use ISO dates or the
/// dotted day-first form (`31.01.2024`).
fn date_value(
  raw: &BTreeMap<String, String>,
  fields: &FieldMap,
  field: LogicalField,
) -> Result<Option<NaiveDate>> {
  let Some(value) = optional_value(raw, fields, field) else {
    return Ok(None);
  };

  for format in ["%Y-%m-%d", "%d.%m.%Y"] {
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
      return Ok(Some(date));
    }
  }

  Err(Error::InvalidDate {
    field: fields.get(field).unwrap_or_default().to_string(),
    value: value.to_string(),
  })
}
