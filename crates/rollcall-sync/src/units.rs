//! Org-unit path resolution.
//!
//! A delimited path like `Radiology\Imaging\MRI` is walked level by level,
//! root first. Each level is a create-or-reuse upsert keyed by (name,
//! parent); re-running the same path never creates a duplicate chain. A
//! relation change is recorded for every level that was newly created.

use rollcall_core::{
  store::RosterStore,
  unit::{UnitMode, UnitRelationChange},
};
use uuid::Uuid;

use crate::error::{Error, Result};

pub struct OrgUnitResolver<'a, S> {
  store:     &'a S,
  mode:      UnitMode,
  delimiter: char,
}

impl<'a, S: RosterStore> OrgUnitResolver<'a, S> {
  pub fn new(store: &'a S, mode: UnitMode, delimiter: char) -> Self {
    OrgUnitResolver {
      store,
      mode,
      delimiter,
    }
  }

  /// Resolve `path` to its leaf unit id, creating missing levels on the way.
  ///
  /// Returns the leaf unit id and one [`UnitRelationChange`] per newly
  /// created unit. A path that is already fully materialized yields zero
  /// changes. A single-element path yields one parent-less unit.
  pub async fn resolve(
    &self,
    path: &str,
  ) -> Result<(Uuid, Vec<UnitRelationChange>)> {
    let segments: Vec<&str> = path
      .split(self.delimiter)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect();

    if segments.is_empty() {
      return Err(Error::EmptyOrgPath);
    }

    match self.mode {
      UnitMode::Tree => self.resolve_tree(&segments).await,
      UnitMode::Cohort => self.resolve_cohort(&segments).await,
    }
  }

  async fn resolve_tree(
    &self,
    segments: &[&str],
  ) -> Result<(Uuid, Vec<UnitRelationChange>)> {
    let mut parent: Option<Uuid> = None;
    let mut changes = Vec::new();

    for name in segments {
      let upsert = self
        .store
        .create_or_reuse_unit(name, parent)
        .await
        .map_err(Error::store)?;

      if upsert.created {
        tracing::debug!(
          unit = %upsert.unit.unit_id,
          %name,
          parent = ?parent,
          "created organisational unit"
        );
        changes.push(UnitRelationChange {
          unit_id:   upsert.unit.unit_id,
          child_id:  upsert.unit.unit_id,
          parent_id: parent,
        });
      }

      parent = Some(upsert.unit.unit_id);
    }

    let leaf = parent.ok_or(Error::EmptyOrgPath)?;
    Ok((leaf, changes))
  }

  /// Cohort mode: the whole path becomes one flat, parent-less group.
  /// The full path is the group name; leaf names alone would collide
  /// across distinct paths.
  async fn resolve_cohort(
    &self,
    segments: &[&str],
  ) -> Result<(Uuid, Vec<UnitRelationChange>)> {
    let name = segments.join(&self.delimiter.to_string());
    let upsert = self
      .store
      .create_or_reuse_unit(&name, None)
      .await
      .map_err(Error::store)?;

    let mut changes = Vec::new();
    if upsert.created {
      changes.push(UnitRelationChange {
        unit_id:   upsert.unit.unit_id,
        child_id:  upsert.unit.unit_id,
        parent_id: None,
      });
    }

    Ok((upsert.unit.unit_id, changes))
  }
}
