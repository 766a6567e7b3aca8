//! End-of-batch notification.

use rollcall_core::event::RuleEngine;

use crate::{
  changes::ChangeSet,
  error::{Error, Result},
};

/// Deliver the batch's two change events to the rule engine.
///
/// Exactly two events are raised per batch, relations first and then members,
/// regardless of how many records the batch carried, and even when a
/// collection is empty. The downstream engine relies on seeing one
/// consistent snapshot per import.
pub async fn notify_batch<E: RuleEngine>(
  engine: &E,
  changes: &ChangeSet,
) -> Result<()> {
  let (relations, members) = changes.to_events();

  tracing::info!(
    relations = relations.len(),
    members = members.len(),
    "notifying rule engine"
  );

  engine.deliver(relations).await.map_err(Error::notify)?;
  engine.deliver(members).await.map_err(Error::notify)?;
  Ok(())
}
