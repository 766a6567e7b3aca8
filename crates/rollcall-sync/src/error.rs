//! Error type for the reconciliation pipeline.
//!
//! Everything except [`Error::Notify`] is a per-record condition: the batch
//! runner catches it, reports the record as failed, and continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Field mapping or feed-shape failure for one record.
  #[error("feed error: {0}")]
  Feed(#[from] rollcall_feed::Error),

  /// The record's org path contained no usable segment.
  #[error("organisational path is empty")]
  EmptyOrgPath,

  /// An underlying repository rejected a write (e.g. malformed email).
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Delivery to the rule engine failed. Batch-level, not per-record.
  #[error("rule engine delivery failed: {0}")]
  Notify(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Store(Box::new(e))
  }

  pub fn notify(e: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Notify(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
