//! In-memory store and rule-engine implementations.
//!
//! Used by the pipeline's own tests, by dry runs, and by any caller that
//! wants to assert the idempotence contracts deterministically without a
//! database.

use std::{
  collections::{BTreeMap, BTreeSet},
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use rollcall_core::{
  Error, Result,
  event::{RuleEngine, RuleEvent},
  person::{Membership, PersonUser, UserUpsert},
  record::{NormalizedRecord, SupervisorContact, validate_email},
  store::RosterStore,
  unit::{OrgUnit, UnitUpsert},
};
use uuid::Uuid;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Inner {
  users:       BTreeMap<Uuid, PersonUser>,
  units:       BTreeMap<Uuid, OrgUnit>,
  memberships: BTreeMap<(Uuid, Uuid), Membership>,
  excluded:    BTreeSet<(Uuid, Uuid)>,
}

/// A [`RosterStore`] kept entirely in process memory.
///
/// Cloning is cheap: the inner state is reference-counted, so clones share
/// one store, matching the single-shared-handle contract of the batch.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> MemoryStore { MemoryStore::default() }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn user_count(&self) -> usize { self.lock().users.len() }

  pub fn unit_count(&self) -> usize { self.lock().units.len() }

  pub fn membership_count(&self) -> usize { self.lock().memberships.len() }

  /// Flag a membership as excluded from sync; subsequent assertions for it
  /// return `None`.
  pub fn exclude_membership(&self, user_id: Uuid, unit_id: Uuid) {
    self.lock().excluded.insert((user_id, unit_id));
  }

  fn upsert_user(
    &self,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
  ) -> Result<UserUpsert> {
    let email = validate_email(email)?.to_lowercase();
    let mut inner = self.lock();

    if let Some(user) = inner.users.values_mut().find(|u| u.email == email) {
      if let Some(name) = first_name {
        user.first_name = name.to_string();
      }
      if let Some(name) = last_name {
        user.last_name = name.to_string();
      }
      return Ok(UserUpsert {
        user:    user.clone(),
        created: false,
      });
    }

    let user = PersonUser {
      user_id: Uuid::new_v4(),
      email,
      first_name: first_name.unwrap_or_default().to_string(),
      last_name: last_name.unwrap_or_default().to_string(),
      supervisor_id: None,
      created_at: Utc::now(),
    };
    inner.users.insert(user.user_id, user.clone());
    Ok(UserUpsert {
      user,
      created: true,
    })
  }
}

impl RosterStore for MemoryStore {
  type Error = Error;

  async fn update_or_create_user(
    &self,
    record: &NormalizedRecord,
  ) -> Result<UserUpsert> {
    self.upsert_user(
      &record.email,
      Some(&record.first_name),
      Some(&record.last_name),
    )
  }

  async fn update_or_create_supervisor(
    &self,
    contact: &SupervisorContact,
  ) -> Result<UserUpsert> {
    let email = contact.email.as_deref().unwrap_or_default();
    self.upsert_user(
      email,
      contact.first_name.as_deref(),
      contact.last_name.as_deref(),
    )
  }

  async fn set_supervisor(
    &self,
    user_id: Uuid,
    supervisor_id: Uuid,
  ) -> Result<()> {
    let mut inner = self.lock();
    let user = inner
      .users
      .get_mut(&user_id)
      .ok_or(Error::UserNotFound(user_id))?;
    user.supervisor_id = Some(supervisor_id);
    Ok(())
  }

  async fn find_user_by_email(
    &self,
    email: &str,
  ) -> Result<Option<PersonUser>> {
    let email = email.trim().to_lowercase();
    Ok(self.lock().users.values().find(|u| u.email == email).cloned())
  }

  async fn list_users(&self) -> Result<Vec<PersonUser>> {
    Ok(self.lock().users.values().cloned().collect())
  }

  async fn create_or_reuse_unit(
    &self,
    name: &str,
    parent_id: Option<Uuid>,
  ) -> Result<UnitUpsert> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyUnitName);
    }

    let mut inner = self.lock();
    if let Some(unit) = inner
      .units
      .values()
      .find(|u| u.name == name && u.parent_id == parent_id)
    {
      return Ok(UnitUpsert {
        unit:    unit.clone(),
        created: false,
      });
    }

    let unit = OrgUnit {
      unit_id: Uuid::new_v4(),
      name: name.to_string(),
      parent_id,
      created_at: Utc::now(),
    };
    inner.units.insert(unit.unit_id, unit.clone());
    Ok(UnitUpsert {
      unit,
      created: true,
    })
  }

  async fn get_unit(&self, unit_id: Uuid) -> Result<Option<OrgUnit>> {
    Ok(self.lock().units.get(&unit_id).cloned())
  }

  async fn list_units(&self) -> Result<Vec<OrgUnit>> {
    Ok(self.lock().units.values().cloned().collect())
  }

  async fn update_or_create_membership(
    &self,
    user_id: Uuid,
    unit_id: Uuid,
  ) -> Result<Option<Membership>> {
    let mut inner = self.lock();
    let key = (user_id, unit_id);

    if inner.excluded.contains(&key) {
      return Ok(None);
    }

    let membership = inner
      .memberships
      .entry(key)
      .and_modify(|m| {
        m.active = true;
        m.last_imported_at = Utc::now();
      })
      .or_insert_with(|| Membership {
        membership_id: Uuid::new_v4(),
        user_id,
        unit_id,
        active: true,
        last_imported_at: Utc::now(),
      });

    Ok(Some(membership.clone()))
  }
}

// ─── Rule engine ─────────────────────────────────────────────────────────────

/// A [`RuleEngine`] that records every delivered event.
#[derive(Debug, Clone, Default)]
pub struct RecordingRuleEngine {
  events: Arc<Mutex<Vec<RuleEvent>>>,
}

impl RecordingRuleEngine {
  pub fn events(&self) -> Vec<RuleEvent> {
    self
      .events
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }
}

impl RuleEngine for RecordingRuleEngine {
  type Error = Infallible;

  async fn deliver(&self, event: RuleEvent) -> Result<(), Infallible> {
    self
      .events
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .push(event);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn user_upsert_is_idempotent_by_email() {
    let store = MemoryStore::new();
    let record = NormalizedRecord::new("Ida@Clinic.Example", "Ward");

    let first = store.update_or_create_user(&record).await.unwrap();
    let second = store.update_or_create_user(&record).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.user.user_id, second.user.user_id);
    // Identity is case-insensitive.
    assert_eq!(second.user.email, "ida@clinic.example");
  }

  #[tokio::test]
  async fn membership_reassertion_returns_the_same_row() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let unit = Uuid::new_v4();

    let first = store
      .update_or_create_membership(user, unit)
      .await
      .unwrap()
      .unwrap();
    let second = store
      .update_or_create_membership(user, unit)
      .await
      .unwrap()
      .unwrap();

    assert_eq!(first.membership_id, second.membership_id);
    assert_eq!(store.membership_count(), 1);
  }
}
