//! The batch runner: one pass over the input list.
//!
//! Records are processed strictly in input order over one shared store
//! handle; a record's path resolution may reuse units created by the record
//! before it. Per-record errors are collected, never propagated as a batch
//! abort, so the run always reaches the notification step.

use std::collections::BTreeMap;

use rollcall_core::{
  event::RuleEngine,
  store::RosterStore,
  unit::{UnitMembershipChange, UnitMode, UnitRelationChange},
};
use rollcall_feed::{FeedVariant, mapping::FieldMap};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  changes::ChangeSet,
  error::Result,
  notify::notify_batch,
  person::{PersonSynchronizer, SyncOutcome},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Per-deployment import settings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
  pub variant:   FeedVariant,
  pub fields:    FieldMap,
  /// Path delimiter; a literal backslash in all observed feeds.
  pub delimiter: char,
  pub mode:      UnitMode,
}

impl Default for ImportOptions {
  fn default() -> ImportOptions {
    ImportOptions {
      variant:   FeedVariant::default(),
      fields:    FieldMap::default(),
      delimiter: '\\',
      mode:      UnitMode::Tree,
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// One record that could not be imported.
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
  /// Position of the record in the input batch.
  pub index: usize,
  pub error: String,
}

/// Summary of one batch run, returned to the operator.
#[derive(Debug, Serialize)]
pub struct ImportReport {
  pub received:           usize,
  pub synced:             usize,
  pub users_created:      usize,
  pub failures:           Vec<RecordFailure>,
  pub relation_changes:   Vec<UnitRelationChange>,
  pub membership_changes: BTreeMap<Uuid, Vec<UnitMembershipChange>>,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

pub struct ImportPipeline<S, E> {
  store:   S,
  engine:  E,
  options: ImportOptions,
}

impl<S: RosterStore, E: RuleEngine> ImportPipeline<S, E> {
  pub fn new(store: S, engine: E, options: ImportOptions) -> Self {
    ImportPipeline {
      store,
      engine,
      options,
    }
  }

  /// Run one import batch to completion.
  ///
  /// Returns `Err` only when rule-engine delivery fails; everything
  /// per-record lands in the report's `failures` list instead.
  pub async fn run(&self, records: &[Value]) -> Result<ImportReport> {
    let synchronizer = PersonSynchronizer::new(
      &self.store,
      self.options.mode,
      self.options.delimiter,
    );
    let mut changes = ChangeSet::default();
    let mut failures = Vec::new();
    let mut synced = 0usize;
    let mut users_created = 0usize;

    for (index, raw) in records.iter().enumerate() {
      match self.run_record(&synchronizer, raw, &mut changes).await {
        Ok(outcome) => {
          synced += 1;
          if outcome.created {
            users_created += 1;
          }
        }
        Err(error) => {
          tracing::warn!(index, %error, "skipping record");
          failures.push(RecordFailure {
            index,
            error: error.to_string(),
          });
        }
      }
    }

    notify_batch(&self.engine, &changes).await?;

    tracing::info!(
      received = records.len(),
      synced,
      users_created,
      failed = failures.len(),
      "import batch complete"
    );

    Ok(ImportReport {
      received: records.len(),
      synced,
      users_created,
      failures,
      relation_changes: changes.relation_changes(),
      membership_changes: changes.membership_changes().clone(),
    })
  }

  async fn run_record(
    &self,
    synchronizer: &PersonSynchronizer<'_, S>,
    raw: &Value,
    changes: &mut ChangeSet,
  ) -> Result<SyncOutcome> {
    let record = self
      .options
      .variant
      .adapter()
      .normalize(raw, &self.options.fields)?;
    synchronizer.synchronize(record, changes).await
  }
}

#[cfg(test)]
mod tests {
  use rollcall_core::event::RuleEvent;
  use serde_json::json;

  use super::*;
  use crate::memory::{MemoryStore, RecordingRuleEngine};

  fn pipeline(
    store: &MemoryStore,
    engine: &RecordingRuleEngine,
  ) -> ImportPipeline<MemoryStore, RecordingRuleEngine> {
    ImportPipeline::new(store.clone(), engine.clone(), ImportOptions::default())
  }

  fn roster() -> Vec<Value> {
    vec![
      json!({
        "Email": "ida@clinic.example",
        "Firstname": "Ida",
        "Lastname": "Keller",
        "Organisation": "Radiology\\Imaging",
        "Manager_Email": "boss@x.com",
      }),
      json!({
        "Email": "jon@clinic.example",
        "Firstname": "Jon",
        "Lastname": "Ruf",
        "Organisation": "Radiology\\Imaging\\MRI",
      }),
    ]
  }

  #[tokio::test]
  async fn a_batch_raises_exactly_two_events() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();

    let report = pipeline(&store, &engine).run(&roster()).await.unwrap();
    assert_eq!(report.synced, 2);

    let events = engine.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], RuleEvent::UnitRelationsUpdated { .. }));
    assert!(matches!(events[1], RuleEvent::UnitMembersUpdated { .. }));
  }

  #[tokio::test]
  async fn example_scenario_one_record_two_units() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();

    let report = pipeline(&store, &engine)
      .run(&roster()[..1])
      .await
      .unwrap();

    // Radiology (parent-less) and Imaging (child of Radiology).
    assert_eq!(store.unit_count(), 2);
    assert_eq!(report.relation_changes.len(), 2);
    // Subject plus supervisor.
    assert_eq!(store.user_count(), 2);
    assert_eq!(report.users_created, 1);
    assert_eq!(report.membership_changes.len(), 1);

    let boss = store
      .find_user_by_email("boss@x.com")
      .await
      .unwrap()
      .unwrap();
    let ida = store
      .find_user_by_email("ida@clinic.example")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(ida.supervisor_id, Some(boss.user_id));
  }

  #[tokio::test]
  async fn later_records_reuse_units_created_earlier_in_the_batch() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();

    let report = pipeline(&store, &engine).run(&roster()).await.unwrap();

    // Radiology, Imaging, MRI: the second record extends the first chain.
    assert_eq!(store.unit_count(), 3);
    assert_eq!(report.relation_changes.len(), 3);
  }

  #[tokio::test]
  async fn rerunning_the_same_batch_creates_nothing_new() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();
    let p = pipeline(&store, &engine);

    p.run(&roster()).await.unwrap();
    let units_before = store.unit_count();
    let users_before = store.user_count();

    let report = p.run(&roster()).await.unwrap();

    assert_eq!(store.unit_count(), units_before);
    assert_eq!(store.user_count(), users_before);
    assert_eq!(report.users_created, 0);
    assert!(report.relation_changes.is_empty());
    // Memberships are still re-asserted for the downstream snapshot.
    assert_eq!(report.membership_changes.len(), 2);
  }

  #[tokio::test]
  async fn one_bad_record_does_not_block_the_batch() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();

    let mut records = roster();
    records.insert(
      1,
      json!({
        "Email": "not an email",
        "Organisation": "Radiology",
      }),
    );

    let report = pipeline(&store, &engine).run(&records).await.unwrap();

    assert_eq!(report.received, 3);
    assert_eq!(report.synced, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.membership_changes.len(), 2);
    // Still exactly two events.
    assert_eq!(engine.events().len(), 2);
  }

  #[tokio::test]
  async fn an_empty_batch_still_notifies() {
    let store = MemoryStore::new();
    let engine = RecordingRuleEngine::default();

    let report = pipeline(&store, &engine).run(&[]).await.unwrap();
    assert_eq!(report.received, 0);
    assert_eq!(engine.events().len(), 2);
  }
}
