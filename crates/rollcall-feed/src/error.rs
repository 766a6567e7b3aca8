//! Error types for the rollcall-feed normalization layer.

use thiserror::Error;

use crate::mapping::LogicalField;

#[derive(Debug, Error)]
pub enum Error {
  /// A required logical field has no configured source. Fatal for the
  /// affected record; the batch continues.
  #[error("no source field configured for logical field {0}")]
  MissingFieldMapping(LogicalField),

  #[error("record carries no value for field {field:?}")]
  MissingValue { field: String },

  #[error("record is not a JSON object")]
  NotAnObject,

  #[error("invalid date in {field}: {value:?}")]
  InvalidDate { field: String, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
