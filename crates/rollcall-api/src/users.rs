//! Handler for `/users`.

use axum::{Json, extract::State};
use rollcall_core::{event::RuleEngine, person::PersonUser, store::RosterStore};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /users`
pub async fn list<S, E>(
  State(state): State<AppState<S, E>>,
  _auth: Authenticated,
) -> Result<Json<Vec<PersonUser>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
  E: RuleEngine + Clone + 'static,
{
  let users = state.store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}
