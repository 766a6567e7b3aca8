//! The `RosterStore` trait: the repository seam the pipeline writes through.
//!
//! The trait is implemented by storage backends (`rollcall-store-sqlite`, the
//! in-memory store in `rollcall-sync`). It folds the user, unit, and
//! membership repository contracts into one handle so a single shared
//! instance can be threaded through a whole batch; later records may reuse
//! units created by earlier ones, so the lookup state must be one and the
//! same.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  person::{Membership, PersonUser, UserUpsert},
  record::{NormalizedRecord, SupervisorContact},
  unit::{OrgUnit, UnitUpsert},
};

/// Abstraction over a roster store backend.
///
/// Every write is an idempotent upsert: re-running the same import batch
/// against the same store must not create duplicate users, units, or
/// memberships.
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Upsert the subject user keyed by `record.email`.
  ///
  /// Creates the user if the email is unknown, otherwise updates name,
  /// entry/exit dates, and profile fields in place. Rejects records whose
  /// email cannot address a mailbox.
  fn update_or_create_user<'a>(
    &'a self,
    record: &'a NormalizedRecord,
  ) -> impl Future<Output = Result<UserUpsert, Self::Error>> + Send + 'a;

  /// Upsert a supervisor user keyed by `contact.email`.
  ///
  /// Callers must not invoke this with an empty contact; check
  /// [`SupervisorContact::is_empty`] first.
  fn update_or_create_supervisor<'a>(
    &'a self,
    contact: &'a SupervisorContact,
  ) -> impl Future<Output = Result<UserUpsert, Self::Error>> + Send + 'a;

  /// Point `user_id` at its supervisor. Overwrites any previous link.
  fn set_supervisor(
    &self,
    user_id: Uuid,
    supervisor_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Look a user up by their stable external identity.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<PersonUser>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonUser>, Self::Error>> + Send + '_;

  // ── Units ─────────────────────────────────────────────────────────────

  /// Create-or-reuse a unit identified by (name, parent).
  ///
  /// If a unit with this name under this exact parent exists it is reused
  /// (`created == false`); otherwise a new unit is created. This is the
  /// idempotence contract behind path resolution: re-resolving the same
  /// path never produces a duplicate unit chain.
  fn create_or_reuse_unit<'a>(
    &'a self,
    name: &'a str,
    parent_id: Option<Uuid>,
  ) -> impl Future<Output = Result<UnitUpsert, Self::Error>> + Send + 'a;

  fn get_unit(
    &self,
    unit_id: Uuid,
  ) -> impl Future<Output = Result<Option<OrgUnit>, Self::Error>> + Send + '_;

  fn list_units(
    &self,
  ) -> impl Future<Output = Result<Vec<OrgUnit>, Self::Error>> + Send + '_;

  // ── Memberships ───────────────────────────────────────────────────────

  /// Assert that `user_id` is an active member of `unit_id` as of this
  /// import.
  ///
  /// Returns `Some` when the membership was created or re-asserted (the
  /// normal case, including unchanged re-runs), `None` when the store
  /// declines to manage this membership (e.g. rows excluded from sync).
  /// Deactivation of stale memberships is a downstream concern.
  fn update_or_create_membership(
    &self,
    user_id: Uuid,
    unit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Membership>, Self::Error>> + Send + '_;
}
