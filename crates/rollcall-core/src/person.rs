//! User and membership entities owned by the repository collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An upserted subject or supervisor user, addressed by email.
///
/// Upsert is idempotent: the same email on repeated import resolves to the
/// same `user_id` and never creates a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonUser {
  pub user_id:       Uuid,
  pub email:         String,
  pub first_name:    String,
  pub last_name:     String,
  /// The user's supervisor, linked after the supervisor upsert.
  pub supervisor_id: Option<Uuid>,
  pub created_at:    DateTime<Utc>,
}

/// Result of a user upsert.
#[derive(Debug, Clone)]
pub struct UserUpsert {
  pub user:    PersonUser,
  pub created: bool,
}

/// A user's membership in a unit, re-asserted on every import that carries
/// the user. Deactivation is a downstream responsibility, never performed
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
  pub membership_id:    Uuid,
  pub user_id:          Uuid,
  pub unit_id:          Uuid,
  pub active:           bool,
  pub last_imported_at: DateTime<Utc>,
}
