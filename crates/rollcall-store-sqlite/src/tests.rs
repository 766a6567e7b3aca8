//! Integration tests for `SqliteStore` against an in-memory database.

use rollcall_core::{
  record::{NormalizedRecord, SupervisorContact},
  store::RosterStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(email: &str, path: &str) -> NormalizedRecord {
  let mut record = NormalizedRecord::new(email, path);
  record.first_name = "Ida".into();
  record.last_name = "Keller".into();
  record
    .profile_fields
    .insert("KisimRolle1".into(), "Pflege".into());
  record
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_upsert_is_idempotent_by_email() {
  let s = store().await;
  let input = record("Ida@Clinic.Example", "Ward");

  let first = s.update_or_create_user(&input).await.unwrap();
  let second = s.update_or_create_user(&input).await.unwrap();

  assert!(first.created);
  assert!(!second.created);
  assert_eq!(first.user.user_id, second.user.user_id);
  assert_eq!(second.user.email, "ida@clinic.example");
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
  let s = store().await;
  let result = s.update_or_create_user(&record("not an email", "Ward")).await;
  assert!(matches!(result, Err(crate::Error::Core(_))));
}

#[tokio::test]
async fn update_refreshes_names() {
  let s = store().await;
  s.update_or_create_user(&record("ida@x.com", "Ward"))
    .await
    .unwrap();

  let mut renamed = record("ida@x.com", "Ward");
  renamed.last_name = "Keller-Ruf".into();
  let upsert = s.update_or_create_user(&renamed).await.unwrap();

  assert!(!upsert.created);
  assert_eq!(upsert.user.last_name, "Keller-Ruf");
}

#[tokio::test]
async fn supervisor_upsert_keeps_existing_names_when_contact_has_none() {
  let s = store().await;
  let full = SupervisorContact {
    email:      Some("boss@x.com".into()),
    first_name: Some("Bo".into()),
    last_name:  Some("Sturm".into()),
  };
  s.update_or_create_supervisor(&full).await.unwrap();

  let email_only = SupervisorContact {
    email: Some("boss@x.com".into()),
    ..SupervisorContact::default()
  };
  let upsert = s.update_or_create_supervisor(&email_only).await.unwrap();

  assert!(!upsert.created);
  assert_eq!(upsert.user.first_name, "Bo");
  assert_eq!(upsert.user.last_name, "Sturm");
}

#[tokio::test]
async fn set_supervisor_links_the_subject() {
  let s = store().await;
  let subject = s
    .update_or_create_user(&record("ida@x.com", "Ward"))
    .await
    .unwrap()
    .user;
  let boss = s
    .update_or_create_supervisor(&SupervisorContact {
      email: Some("boss@x.com".into()),
      ..SupervisorContact::default()
    })
    .await
    .unwrap()
    .user;

  s.set_supervisor(subject.user_id, boss.user_id)
    .await
    .unwrap();

  let reloaded = s
    .find_user_by_email("ida@x.com")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(reloaded.supervisor_id, Some(boss.user_id));
}

#[tokio::test]
async fn set_supervisor_for_unknown_user_fails() {
  let s = store().await;
  let result = s.set_supervisor(Uuid::new_v4(), Uuid::new_v4()).await;
  assert!(matches!(result, Err(crate::Error::UserNotFound(_))));
}

// ─── Units ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unit_create_or_reuse_is_keyed_by_name_and_parent() {
  let s = store().await;

  let root = s.create_or_reuse_unit("Radiology", None).await.unwrap();
  assert!(root.created);

  let reused = s.create_or_reuse_unit("Radiology", None).await.unwrap();
  assert!(!reused.created);
  assert_eq!(reused.unit.unit_id, root.unit.unit_id);

  let child = s
    .create_or_reuse_unit("Imaging", Some(root.unit.unit_id))
    .await
    .unwrap();
  assert!(child.created);
  assert_eq!(child.unit.parent_id, Some(root.unit.unit_id));

  // Same name under a different parent is a different unit.
  let elsewhere = s.create_or_reuse_unit("Imaging", None).await.unwrap();
  assert!(elsewhere.created);
  assert_ne!(elsewhere.unit.unit_id, child.unit.unit_id);

  assert_eq!(s.list_units().await.unwrap().len(), 3);
}

#[tokio::test]
async fn blank_unit_name_is_rejected() {
  let s = store().await;
  assert!(s.create_or_reuse_unit("   ", None).await.is_err());
}

#[tokio::test]
async fn get_unit_round_trips() {
  let s = store().await;
  let created = s.create_or_reuse_unit("Ward", None).await.unwrap().unit;
  let fetched = s.get_unit(created.unit_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Ward");
  assert_eq!(fetched.parent_id, None);
  assert!(s.get_unit(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Memberships ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn membership_is_created_then_reasserted() {
  let s = store().await;
  let user = s
    .update_or_create_user(&record("ida@x.com", "Ward"))
    .await
    .unwrap()
    .user;
  let unit = s.create_or_reuse_unit("Ward", None).await.unwrap().unit;

  let first = s
    .update_or_create_membership(user.user_id, unit.unit_id)
    .await
    .unwrap()
    .expect("created");
  let second = s
    .update_or_create_membership(user.user_id, unit.unit_id)
    .await
    .unwrap()
    .expect("re-asserted");

  assert_eq!(first.membership_id, second.membership_id);
  assert!(second.active);
}

#[tokio::test]
async fn sync_excluded_membership_is_declined() {
  let s = store().await;
  let user = s
    .update_or_create_user(&record("ida@x.com", "Ward"))
    .await
    .unwrap()
    .user;
  let unit = s.create_or_reuse_unit("Ward", None).await.unwrap().unit;

  s.update_or_create_membership(user.user_id, unit.unit_id)
    .await
    .unwrap();
  s.set_membership_sync_excluded(user.user_id, unit.unit_id, true)
    .await
    .unwrap();

  let declined = s
    .update_or_create_membership(user.user_id, unit.unit_id)
    .await
    .unwrap();
  assert!(declined.is_none());
}
