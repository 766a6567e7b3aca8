//! Handler for `/units`.

use axum::{Json, extract::State};
use rollcall_core::{event::RuleEngine, store::RosterStore, unit::OrgUnit};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /units`
pub async fn list<S, E>(
  State(state): State<AppState<S, E>>,
  _auth: Authenticated,
) -> Result<Json<Vec<OrgUnit>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
  E: RuleEngine + Clone + 'static,
{
  let units = state.store.list_units().await.map_err(ApiError::store)?;
  Ok(Json(units))
}
