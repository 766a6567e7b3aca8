//! Batch-scoped change aggregation.
//!
//! Two append-only collections live for the duration of one batch run and
//! are drained into the two rule-engine events at the end.

use std::collections::BTreeMap;

use rollcall_core::{
  event::{MemberUnit, RuleEvent},
  unit::{UnitMembershipChange, UnitRelationChange},
};
use uuid::Uuid;

/// Accumulated relation and membership changes for one batch.
///
/// Relation changes are keyed by unit id with last-write-wins semantics:
/// a later write for the same unit replaces the earlier one, so downstream
/// consumers see a final-state snapshot of the batch, not a change log.
/// Membership changes are keyed by user id and deduplicated per unit.
#[derive(Debug, Default)]
pub struct ChangeSet {
  relations:   BTreeMap<Uuid, UnitRelationChange>,
  memberships: BTreeMap<Uuid, Vec<UnitMembershipChange>>,
}

impl ChangeSet {
  pub fn record_relation(&mut self, change: UnitRelationChange) {
    self.relations.insert(change.unit_id, change);
  }

  pub fn record_membership(&mut self, change: UnitMembershipChange) {
    let units = self.memberships.entry(change.user_id).or_default();
    if !units.iter().any(|c| c.unit_id == change.unit_id) {
      units.push(change);
    }
  }

  pub fn relation_changes(&self) -> Vec<UnitRelationChange> {
    self.relations.values().cloned().collect()
  }

  pub fn membership_changes(
    &self,
  ) -> &BTreeMap<Uuid, Vec<UnitMembershipChange>> {
    &self.memberships
  }

  pub fn is_empty(&self) -> bool {
    self.relations.is_empty() && self.memberships.is_empty()
  }

  /// Build the two batch events, in delivery order: relations first, then
  /// members.
  pub fn to_events(&self) -> (RuleEvent, RuleEvent) {
    let relations = RuleEvent::UnitRelationsUpdated {
      changes: self.relation_changes(),
    };
    let members = RuleEvent::UnitMembersUpdated {
      changes: self
        .memberships
        .iter()
        .map(|(user_id, units)| {
          let units = units
            .iter()
            .map(|c| MemberUnit { unit: c.unit_id })
            .collect();
          (*user_id, units)
        })
        .collect(),
    };
    (relations, members)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn relation(unit_id: Uuid, parent_id: Option<Uuid>) -> UnitRelationChange {
    UnitRelationChange {
      unit_id,
      child_id: unit_id,
      parent_id,
    }
  }

  #[test]
  fn later_relation_write_for_the_same_unit_wins() {
    let unit = Uuid::new_v4();
    let first_parent = Uuid::new_v4();
    let second_parent = Uuid::new_v4();

    let mut set = ChangeSet::default();
    set.record_relation(relation(unit, Some(first_parent)));
    set.record_relation(relation(unit, Some(second_parent)));

    let changes = set.relation_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].parent_id, Some(second_parent));
  }

  #[test]
  fn membership_is_deduplicated_per_user_and_unit() {
    let user = Uuid::new_v4();
    let unit_a = Uuid::new_v4();
    let unit_b = Uuid::new_v4();

    let mut set = ChangeSet::default();
    for unit_id in [unit_a, unit_a, unit_b] {
      set.record_membership(UnitMembershipChange {
        user_id: user,
        unit_id,
      });
    }

    assert_eq!(set.membership_changes()[&user].len(), 2);
  }

  #[test]
  fn events_carry_the_wire_shape() {
    let user = Uuid::new_v4();
    let unit = Uuid::new_v4();

    let mut set = ChangeSet::default();
    set.record_relation(relation(unit, None));
    set.record_membership(UnitMembershipChange {
      user_id: user,
      unit_id: unit,
    });

    let (relations, members) = set.to_events();
    assert_eq!(relations.name(), "unit_relations_updated");
    assert_eq!(relations.len(), 1);

    let json = serde_json::to_value(&members).unwrap();
    assert_eq!(
      json["payload"]["changes"][user.to_string()][0]["unit"],
      serde_json::json!(unit.to_string())
    );
  }
}
