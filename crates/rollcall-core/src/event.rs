//! Batch change events consumed by the downstream rule engine.
//!
//! Exactly two events are raised per import batch, regardless of how many
//! records it carried: one with every relation change, one with every
//! membership change. The rule engine thus sees a consistent snapshot of the
//! whole import instead of partial intermediate states.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::unit::UnitRelationChange;

/// One unit assertion inside [`RuleEvent::UnitMembersUpdated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUnit {
  pub unit: Uuid,
}

/// A batched change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum RuleEvent {
  /// Every unit whose parent linkage was newly established in this batch.
  UnitRelationsUpdated { changes: Vec<UnitRelationChange> },
  /// Every unit membership asserted in this batch, keyed by user.
  UnitMembersUpdated {
    changes: BTreeMap<Uuid, Vec<MemberUnit>>,
  },
}

impl RuleEvent {
  /// Stable event name, used for logging and webhook payloads.
  pub fn name(&self) -> &'static str {
    match self {
      RuleEvent::UnitRelationsUpdated { .. } => "unit_relations_updated",
      RuleEvent::UnitMembersUpdated { .. } => "unit_members_updated",
    }
  }

  /// Number of change entries carried by the event.
  pub fn len(&self) -> usize {
    match self {
      RuleEvent::UnitRelationsUpdated { changes } => changes.len(),
      RuleEvent::UnitMembersUpdated { changes } => {
        changes.values().map(Vec::len).sum()
      }
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Delivery seam for the external rule engine.
///
/// The engine itself is out of scope; this pipeline only guarantees the
/// two-events-per-batch contract and the ordering (relations before members).
pub trait RuleEngine: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver(
    &self,
    event: RuleEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
