//! HTTP surface for Rollcall.
//!
//! Exposes an axum [`Router`] with an authenticated import endpoint and
//! read-only inspection endpoints, backed by any
//! [`rollcall_core::store::RosterStore`] and any
//! [`rollcall_core::event::RuleEngine`].
//!
//! | Method | Path      | Notes                                   |
//! |--------|-----------|-----------------------------------------|
//! | `POST` | `/import` | Body: JSON array of raw feed records    |
//! | `GET`  | `/units`  | All known organisational units          |
//! | `GET`  | `/users`  | All known users                         |

pub mod auth;
pub mod error;
pub mod import;
pub mod notify;
pub mod units;
pub mod users;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::{event::RuleEngine, store::RosterStore, unit::UnitMode};
use rollcall_feed::{FeedVariant, mapping::FieldMap};
use rollcall_sync::ImportOptions;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Feed settings block of the server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
  pub variant:   FeedVariant,
  pub fields:    FieldMap,
  /// Single-character path delimiter; a literal backslash everywhere
  /// observed so far.
  pub delimiter: String,
  pub unit_mode: UnitMode,
}

impl Default for FeedConfig {
  fn default() -> FeedConfig {
    FeedConfig {
      variant:   FeedVariant::default(),
      fields:    FieldMap::default(),
      delimiter: "\\".to_string(),
      unit_mode: UnitMode::default(),
    }
  }
}

impl FeedConfig {
  pub fn import_options(&self) -> ImportOptions {
    ImportOptions {
      variant:   self.variant,
      fields:    self.fields.clone(),
      delimiter: self.delimiter.chars().next().unwrap_or('\\'),
      mode:      self.unit_mode,
    }
  }
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Where batch events are POSTed; log-only delivery when absent.
  pub rule_engine_url:    Option<String>,
  #[serde(default)]
  pub feed:               FeedConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, E> {
  pub store:   S,
  pub engine:  E,
  pub auth:    Arc<AuthConfig>,
  pub options: ImportOptions,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Rollcall server.
pub fn router<S, E>(state: AppState<S, E>) -> Router
where
  S: RosterStore + Clone + Send + Sync + 'static,
  E: RuleEngine + Clone + 'static,
{
  Router::new()
    .route("/import", post(import::run::<S, E>))
    .route("/units", get(units::list::<S, E>))
    .route("/users", get(users::list::<S, E>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
