//! Feed normalization for Rollcall.
//!
//! Converts raw external person records (feed-specific JSON shapes) into
//! [`rollcall_core::record::NormalizedRecord`]s. Pure and synchronous; no
//! HTTP or database dependencies.
//!
//! Each feed variant is an implementation of [`FeedAdapter`]; the
//! variant-independent translation table lives in [`mapping`].

pub mod error;
pub mod mapping;
mod profile_map;
mod structured;

pub use error::{Error, Result};
pub use profile_map::ProfileMapFeed;
pub use structured::StructuredFeed;

use rollcall_core::record::NormalizedRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::FieldMap;

// ─── Adapter seam ────────────────────────────────────────────────────────────

/// A feed variant: anything that can yield a normalized record from one raw
/// external record.
pub trait FeedAdapter: Send + Sync {
  /// Normalize one raw record. A failure is fatal for this record only;
  /// callers continue with the rest of the batch.
  fn normalize(&self, raw: &Value, fields: &FieldMap)
  -> Result<NormalizedRecord>;
}

/// Configuration handle selecting a feed variant.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeedVariant {
  #[default]
  Structured,
  ProfileMap,
}

impl FeedVariant {
  pub fn adapter(self) -> &'static dyn FeedAdapter {
    match self {
      FeedVariant::Structured => &StructuredFeed,
      FeedVariant::ProfileMap => &ProfileMapFeed,
    }
  }
}

/// Normalize every record of a batch independently.
///
/// A malformed record yields `Err(…)` in the corresponding position without
/// aborting the rest; one bad record must never block an entire feed import.
pub fn normalize_batch(
  variant: FeedVariant,
  records: &[Value],
  fields: &FieldMap,
) -> Vec<Result<NormalizedRecord>> {
  let adapter = variant.adapter();
  records
    .iter()
    .map(|raw| adapter.normalize(raw, fields))
    .collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn a_bad_record_does_not_poison_the_batch() {
    let records = vec![
      json!({ "Email": "one@x.example", "Organisation": "A" }),
      json!("not an object"),
      json!({ "Email": "three@x.example", "Organisation": "A\\B" }),
    ];

    let results =
      normalize_batch(FeedVariant::Structured, &records, &FieldMap::default());

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
  }
}
