//! Organisational units and the batch-level change records derived from them.
//!
//! Unit identity is structural: a unit is "the same" when its name and parent
//! match an existing unit. Units are created lazily during path resolution and
//! never deleted by this pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Unit ────────────────────────────────────────────────────────────────────

/// One node in the organisational tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
  pub unit_id:    Uuid,
  pub name:       String,
  /// `None` for root units.
  pub parent_id:  Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

/// Result of a create-or-reuse unit upsert.
#[derive(Debug, Clone)]
pub struct UnitUpsert {
  pub unit:    OrgUnit,
  /// `true` when the unit (and hence its parent relation) was newly created
  /// by this call; `false` when an existing unit was reused.
  pub created: bool,
}

// ─── Materialization mode ────────────────────────────────────────────────────

/// Site-wide switch controlling how an org path is materialized.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
  /// Every path level becomes a node in the hierarchy.
  #[default]
  Tree,
  /// The whole path becomes one flat, parent-less membership group.
  Cohort,
}

// ─── Change records ──────────────────────────────────────────────────────────

/// A newly established parent/child link, surfaced once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRelationChange {
  pub unit_id:   Uuid,
  pub child_id:  Uuid,
  pub parent_id: Option<Uuid>,
}

/// An assertion that a user belongs to a unit as of this import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMembershipChange {
  pub user_id: Uuid,
  pub unit_id: Uuid,
}
