//! The flat profile-field-map feed variant.
//!
//! Records carry identity fields at the top level plus a bag of custom
//! profile fields whose names are prefixed `profile_field_`. The delimited
//! org path lives in one of those profile fields; which one is configured
//! through the field map, addressed by its unprefixed name.

use std::collections::BTreeMap;

use rollcall_core::record::NormalizedRecord;
use serde_json::Value;

use crate::{
  FeedAdapter,
  error::{Error, Result},
  mapping::{self, FieldMap},
  structured::scalar_to_string,
};

const PROFILE_PREFIX: &str = "profile_field_";

pub struct ProfileMapFeed;

impl FeedAdapter for ProfileMapFeed {
  fn normalize(
    &self,
    raw: &Value,
    fields: &FieldMap,
  ) -> Result<NormalizedRecord> {
    let object = raw.as_object().ok_or(Error::NotAnObject)?;

    let mut flat = BTreeMap::new();
    for (name, value) in object {
      let Some(text) = scalar_to_string(value) else {
        continue;
      };
      let name = name
        .strip_prefix(PROFILE_PREFIX)
        .unwrap_or(name)
        .to_string();
      flat.insert(name, text);
    }

    mapping::map(&flat, fields)
  }
}
