//! Handler for `POST /import`: run one feed batch through the pipeline.

use axum::{Json, extract::State};
use rollcall_core::{event::RuleEngine, store::RosterStore};
use rollcall_sync::{ImportPipeline, ImportReport};
use serde_json::Value;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `POST /import`, body: a JSON array of raw feed records.
///
/// Per-record failures are reported inside the returned [`ImportReport`];
/// only rule-engine delivery failures surface as an error response.
pub async fn run<S, E>(
  State(state): State<AppState<S, E>>,
  _auth: Authenticated,
  Json(records): Json<Vec<Value>>,
) -> Result<Json<ImportReport>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
  E: RuleEngine + Clone + 'static,
{
  tracing::info!(records = records.len(), "import batch received");

  let pipeline = ImportPipeline::new(
    state.store.clone(),
    state.engine.clone(),
    state.options.clone(),
  );
  let report = pipeline.run(&records).await?;

  Ok(Json(report))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use rollcall_sync::memory::{MemoryStore, RecordingRuleEngine};
  use serde_json::json;

  use super::*;
  use crate::auth::AuthConfig;

  fn state() -> AppState<MemoryStore, RecordingRuleEngine> {
    AppState {
      store:   MemoryStore::new(),
      engine:  RecordingRuleEngine::default(),
      auth:    Arc::new(AuthConfig {
        username:      "roster".into(),
        password_hash: String::new(),
      }),
      options: rollcall_sync::ImportOptions::default(),
    }
  }

  #[tokio::test]
  async fn import_returns_a_report_and_notifies_once() {
    let state = state();
    let records = vec![
      json!({
        "Email": "ida@clinic.example",
        "Organisation": "Radiology\\Imaging",
      }),
      json!({ "Email": "broken", "Organisation": "Radiology" }),
    ];

    let Json(report) =
      run(State(state.clone()), Authenticated, Json(records))
        .await
        .unwrap();

    assert_eq!(report.received, 2);
    assert_eq!(report.synced, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(state.engine.events().len(), 2);
    // The failed record's path still resolved before the user upsert.
    assert_eq!(state.store.unit_count(), 2);
  }
}
