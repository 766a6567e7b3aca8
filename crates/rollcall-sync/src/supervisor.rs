//! Supervisor resolution.

use rollcall_core::{record::SupervisorContact, store::RosterStore};
use uuid::Uuid;

use crate::error::{Error, Result};

pub struct SupervisorResolver<'a, S> {
  store: &'a S,
}

impl<'a, S: RosterStore> SupervisorResolver<'a, S> {
  pub fn new(store: &'a S) -> Self { SupervisorResolver { store } }

  /// Upsert the supervisor user and return its id.
  ///
  /// An empty contact is a valid outcome, not an error: the record simply
  /// has no supervisor, and no upsert is performed. Otherwise the upsert is
  /// keyed by the supervisor's email and idempotent across runs.
  pub async fn resolve(
    &self,
    contact: &SupervisorContact,
  ) -> Result<Option<Uuid>> {
    if contact.is_empty() {
      return Ok(None);
    }

    let upsert = self
      .store
      .update_or_create_supervisor(contact)
      .await
      .map_err(Error::store)?;

    Ok(Some(upsert.user.user_id))
  }
}
