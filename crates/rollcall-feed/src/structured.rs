//! The structured roster feed variant.
//!
//! Records arrive as one JSON object per person with well-known top-level
//! fields (`Organisation`, `Manager_Email`, `KisimRolle1`, `EntryDate`,
//! `ExitDate`, …). Scalar values are taken verbatim; nested structures have
//! no defined meaning in this variant and are ignored.

use std::collections::BTreeMap;

use rollcall_core::record::NormalizedRecord;
use serde_json::Value;

use crate::{
  FeedAdapter,
  error::{Error, Result},
  mapping::{self, FieldMap},
};

pub struct StructuredFeed;

impl FeedAdapter for StructuredFeed {
  fn normalize(
    &self,
    raw: &Value,
    fields: &FieldMap,
  ) -> Result<NormalizedRecord> {
    mapping::map(&flatten(raw)?, fields)
  }
}

/// Reduce a record object to a flat `field name → string value` view.
pub(crate) fn flatten(raw: &Value) -> Result<BTreeMap<String, String>> {
  let object = raw.as_object().ok_or(Error::NotAnObject)?;

  let mut flat = BTreeMap::new();
  for (name, value) in object {
    if let Some(text) = scalar_to_string(value) {
      flat.insert(name.clone(), text);
    }
  }
  Ok(flat)
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn normalizes_a_full_record() {
    let raw = json!({
      "Email": "ida@clinic.example",
      "Firstname": "Ida",
      "Lastname": "Keller",
      "Organisation": "Radiology\\Imaging",
      "Manager_Email": "boss@clinic.example",
      "Manager_Firstname": "Bo",
      "Manager_Lastname": "Sturm",
      "KisimRolle1": "Pflege",
      "EntryDate": "2024-02-01",
    });

    let record = StructuredFeed
      .normalize(&raw, &FieldMap::default())
      .unwrap();

    assert_eq!(record.email, "ida@clinic.example");
    assert_eq!(record.org_path, "Radiology\\Imaging");
    assert_eq!(record.supervisor.last_name.as_deref(), Some("Sturm"));
    assert_eq!(record.profile_fields["KisimRolle1"], "Pflege");
  }

  #[test]
  fn non_object_records_are_rejected() {
    let err = StructuredFeed
      .normalize(&json!(["not", "an", "object"]), &FieldMap::default())
      .unwrap_err();
    assert!(matches!(err, Error::NotAnObject));
  }

  #[test]
  fn numbers_and_bools_become_profile_strings() {
    let raw = json!({
      "Email": "n@x.example",
      "Organisation": "Ward",
      "Fte": 0.8,
      "External": false,
      "Ignored": {"nested": true},
    });
    let record = StructuredFeed
      .normalize(&raw, &FieldMap::default())
      .unwrap();
    assert_eq!(record.profile_fields["Fte"], "0.8");
    assert_eq!(record.profile_fields["External"], "false");
    assert!(!record.profile_fields.contains_key("Ignored"));
  }
}
