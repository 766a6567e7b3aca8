//! The normalized person record: the canonical shape every feed variant is
//! reduced to before it touches any repository.
//!
//! A `NormalizedRecord` is created once per external record by the field
//! mapper and consumed by the person synchronizer. The raw external record is
//! never mutated; everything downstream of the feed layer sees only this.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Supervisor contact ──────────────────────────────────────────────────────

/// Raw supervisor contact fields lifted from the external record.
///
/// An empty contact is a valid, non-error state: not every record has a
/// supervisor. Callers must check [`SupervisorContact::is_empty`] before
/// attempting an upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorContact {
  pub email:      Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
}

impl SupervisorContact {
  /// `true` when there is no usable email; the supervisor upsert is keyed by
  /// email, so name-only contacts count as absent too.
  pub fn is_empty(&self) -> bool {
    self
      .email
      .as_deref()
      .map(str::trim)
      .is_none_or(str::is_empty)
  }
}

// ─── Normalized record ───────────────────────────────────────────────────────

/// One person record after field mapping, keyed by canonical role rather than
/// by feed-specific field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
  /// Stable external identity of the subject user.
  pub email:          String,
  pub first_name:     String,
  pub last_name:      String,
  /// Delimited organisational path, root first (e.g. `Radiology\Imaging`).
  pub org_path:       String,
  pub supervisor:     SupervisorContact,
  pub entry_date:     Option<NaiveDate>,
  pub exit_date:      Option<NaiveDate>,
  /// Leaf unit resolved for this record; filled in by the synchronizer
  /// before the user upsert so the repository sees the complete record.
  pub unit_id:        Option<Uuid>,
  /// Feed fields with no canonical role, carried through verbatim as custom
  /// profile data.
  pub profile_fields: BTreeMap<String, String>,
}

impl NormalizedRecord {
  pub fn new(
    email: impl Into<String>,
    org_path: impl Into<String>,
  ) -> NormalizedRecord {
    NormalizedRecord {
      email:          email.into(),
      first_name:     String::new(),
      last_name:      String::new(),
      org_path:       org_path.into(),
      supervisor:     SupervisorContact::default(),
      entry_date:     None,
      exit_date:      None,
      unit_id:        None,
      profile_fields: BTreeMap::new(),
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Minimal email sanity check shared by every repository implementation.
///
/// Intentionally permissive; the upstream HR feed is the source of truth,
/// this only rejects values that cannot possibly address a mailbox.
pub fn validate_email(email: &str) -> Result<&str> {
  let trimmed = email.trim();
  let valid = trimmed.split_once('@').is_some_and(|(local, domain)| {
    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
  }) && !trimmed.contains(char::is_whitespace);

  if valid {
    Ok(trimmed)
  } else {
    Err(Error::InvalidEmail(email.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_plain_addresses() {
    assert!(validate_email("a.person@example.com").is_ok());
    assert_eq!(validate_email("  padded@x.org  ").unwrap(), "padded@x.org");
  }

  #[test]
  fn rejects_malformed_addresses() {
    for bad in ["", "no-at-sign", "@nodomain", "local@", "two@@ats", "sp ace@x.com"] {
      assert!(validate_email(bad).is_err(), "accepted {bad:?}");
    }
  }

  #[test]
  fn contact_without_email_is_empty() {
    let contact = SupervisorContact {
      email:      Some("   ".into()),
      first_name: Some("Ada".into()),
      last_name:  None,
    };
    assert!(contact.is_empty());
    assert!(SupervisorContact::default().is_empty());

    let full = SupervisorContact {
      email: Some("boss@x.com".into()),
      ..SupervisorContact::default()
    };
    assert!(!full.is_empty());
  }
}
