//! The person synchronizer: per-record orchestration.
//!
//! Ordering is load-bearing: the unit chain must exist before the user
//! record references it, and the supervisor must be upserted before the
//! subject's supervisor link is written.

use rollcall_core::{
  person::PersonUser,
  record::NormalizedRecord,
  store::RosterStore,
  unit::{UnitMembershipChange, UnitMode},
};

use crate::{
  changes::ChangeSet,
  error::{Error, Result},
  supervisor::SupervisorResolver,
  units::OrgUnitResolver,
};

/// Result of synchronizing one record.
#[derive(Debug)]
pub struct SyncOutcome {
  pub user:    PersonUser,
  /// `true` when the subject user was newly created by this record.
  pub created: bool,
}

pub struct PersonSynchronizer<'a, S> {
  store: &'a S,
  units: OrgUnitResolver<'a, S>,
}

impl<'a, S: RosterStore> PersonSynchronizer<'a, S> {
  pub fn new(store: &'a S, mode: UnitMode, delimiter: char) -> Self {
    PersonSynchronizer {
      store,
      units: OrgUnitResolver::new(store, mode, delimiter),
    }
  }

  /// Synchronize one normalized record into the store.
  ///
  /// Any error is fatal for this record only; the caller reports it and
  /// continues with the rest of the batch. Units created in step (1) stay
  /// created even when a later step fails; their relation changes are
  /// already recorded in `changes`.
  pub async fn synchronize(
    &self,
    mut record: NormalizedRecord,
    changes: &mut ChangeSet,
  ) -> Result<SyncOutcome> {
    // (1) Resolve the unit chain and attach the leaf to the record.
    let (leaf_unit, relation_changes) =
      self.units.resolve(&record.org_path).await?;
    for change in relation_changes {
      changes.record_relation(change);
    }
    record.unit_id = Some(leaf_unit);

    // (2) Upsert the subject user with the complete record.
    let upsert = self
      .store
      .update_or_create_user(&record)
      .await
      .map_err(Error::store)?;
    let mut user = upsert.user;

    // (3) Resolve and link the supervisor.
    let supervisor = SupervisorResolver::new(self.store)
      .resolve(&record.supervisor)
      .await?;
    if let Some(supervisor_id) = supervisor {
      self
        .store
        .set_supervisor(user.user_id, supervisor_id)
        .await
        .map_err(Error::store)?;
      user.supervisor_id = Some(supervisor_id);
    }

    // (4) Assert the unit membership; (5) record it for the batch events
    // when the store accepted it.
    let membership = self
      .store
      .update_or_create_membership(user.user_id, leaf_unit)
      .await
      .map_err(Error::store)?;
    if let Some(membership) = membership {
      changes.record_membership(UnitMembershipChange {
        user_id: user.user_id,
        unit_id: membership.unit_id,
      });
    }

    tracing::debug!(
      user = %user.user_id,
      unit = %leaf_unit,
      created = upsert.created,
      "synchronized person record"
    );

    Ok(SyncOutcome {
      user,
      created: upsert.created,
    })
  }
}
