//! Integration tests for the windowed maintenance sync.

use bson::doc;
use chrono::Duration;
use stockhub_sync::db::Store;
use stockhub_sync::document::{DocumentStore, MemoryDocumentStore};
use stockhub_sync::models::{
    ActivityRecord, ApplicationRecord, ApplicationStatus, EntityKind, Role, UserRecord, UserRef,
};
use stockhub_sync::sync::{MaintenanceSyncer, check_windows, datetime};

async fn setup() -> (Store, MemoryDocumentStore) {
    let db_path = std::env::temp_dir().join(format!(
        "stockhub-maintenance-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open test database");

    (store, MemoryDocumentStore::new())
}

fn alice() -> UserRecord {
    UserRecord {
        username: "alice".to_string(),
        email: "alice@stockhub.test".to_string(),
        hashed_password: "$argon2id$v=19$m=8192,t=3,p=1$alice".to_string(),
        role: Role::Employee,
        first_name: None,
        last_name: None,
        phone: None,
        address: None,
        is_active: true,
        branch_id: None,
        last_login: None,
        created_at: None,
    }
}

fn activity(action: &str, hours_ago: i64) -> ActivityRecord {
    ActivityRecord {
        user: UserRef::Relational(0),
        action: action.to_string(),
        description: None,
        category: None,
        ip_address: None,
        user_agent: None,
        timestamp: Some(datetime::now() - Duration::hours(hours_ago)),
    }
}

fn application(full_name: &str, days_ago: i64) -> ApplicationRecord {
    let at = datetime::now() - Duration::days(days_ago);
    ApplicationRecord {
        full_name: full_name.to_string(),
        email: "applicant@example.test".to_string(),
        phone: "+15550100".to_string(),
        address: None,
        is_business_account: true,
        business_name: Some(format!("{full_name} Ltd")),
        business_type: Some("retail".to_string()),
        item_type: "Electronics".to_string(),
        estimated_volume: None,
        storage_type: "climate_controlled".to_string(),
        access_frequency: Some("weekly".to_string()),
        storage_duration: None,
        special_requirements: None,
        insurance_required: false,
        packing_services: true,
        transportation_needed: true,
        inventory_list_url: None,
        identification_doc_url: None,
        status: ApplicationStatus::Pending,
        employee_notes: None,
        reviewed_by: None,
        review_date: None,
        created_at: Some(at),
        updated_at: Some(at),
    }
}

#[tokio::test]
async fn test_recent_activities_replaces_only_the_window() {
    let (store, docs) = setup().await;
    let now = datetime::now();

    let alice_id = store.users().insert(&alice(), now).await.unwrap();
    let alice_oid = docs
        .insert_one(EntityKind::Users, alice().to_document(None, now))
        .await
        .unwrap();

    store
        .activities()
        .insert(alice_id, &activity("old_row", 48), now)
        .await
        .unwrap();
    store
        .activities()
        .insert(alice_id, &activity("recent_row", 1), now)
        .await
        .unwrap();

    docs.insert_one(
        EntityKind::UserActivities,
        activity("recent_doc", 0).to_document(alice_oid, None, now),
    )
    .await
    .unwrap();
    docs.insert_one(
        EntityKind::UserActivities,
        activity("old_doc", 72).to_document(alice_oid, None, now),
    )
    .await
    .unwrap();

    let step = MaintenanceSyncer::new(&store, &docs)
        .sync_recent_activities(24)
        .await;

    assert!(step.is_clean());
    assert_eq!(step.deleted, 1);
    assert_eq!(step.inserted, 1);

    let mut actions: Vec<String> = store
        .activities()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    actions.sort();
    assert_eq!(actions, vec!["old_row", "recent_doc"]);
}

#[tokio::test]
async fn test_recent_activity_with_unknown_user_is_skipped() {
    let (store, docs) = setup().await;
    let now = datetime::now();

    docs.insert_one(
        EntityKind::UserActivities,
        doc! { "user_id": "nobody", "action": "login", "timestamp": datetime::to_document(now) },
    )
    .await
    .unwrap();

    let step = MaintenanceSyncer::new(&store, &docs)
        .sync_recent_activities(24)
        .await;

    assert!(step.is_clean());
    assert_eq!(step.inserted, 0);
    assert_eq!(step.skipped.len(), 1);
    assert_eq!(store.activities().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_application_backup_recopies_recent_changes() {
    let (store, docs) = setup().await;
    let now = datetime::now();

    let recent_id = store
        .applications()
        .insert(&application("Northwind", 0), now)
        .await
        .unwrap();
    store
        .applications()
        .insert(&application("Contoso", 5), now)
        .await
        .unwrap();

    let stale = application("Northwind", 0);
    let mut stale_doc = stale.to_document(None, Some(recent_id), now);
    stale_doc.insert("status", "pending_old");
    stale_doc.insert(
        "updated_at",
        datetime::to_document(now - Duration::hours(2)),
    );
    docs.insert_one(EntityKind::CustomerApplications, stale_doc)
        .await
        .unwrap();
    docs.insert_one(
        EntityKind::CustomerApplications,
        application("Contoso", 10).to_document(None, Some(99), now),
    )
    .await
    .unwrap();

    let step = MaintenanceSyncer::new(&store, &docs)
        .backup_recent_applications(1)
        .await;

    assert!(step.is_clean());
    assert_eq!(step.deleted, 1);
    assert_eq!(step.inserted, 1);

    let all = docs.find_all(EntityKind::CustomerApplications).await.unwrap();
    assert_eq!(all.len(), 2);
    let northwind = all
        .iter()
        .find(|d| d.get_i32("sqlite_id").ok() == Some(recent_id))
        .unwrap();
    assert_eq!(northwind.get_str("status").unwrap(), "pending");
    assert!(northwind.get_bool("packing_services").unwrap());
}

#[tokio::test]
async fn test_application_backup_without_changes_is_a_no_op() {
    let (store, docs) = setup().await;
    let now = datetime::now();

    store
        .applications()
        .insert(&application("Contoso", 5), now)
        .await
        .unwrap();
    docs.insert_one(
        EntityKind::CustomerApplications,
        application("Fabrikam", 0).to_document(None, None, now),
    )
    .await
    .unwrap();

    let step = MaintenanceSyncer::new(&store, &docs)
        .backup_recent_applications(1)
        .await;

    assert_eq!(step.deleted, 0);
    assert_eq!(step.inserted, 0);
    assert_eq!(
        docs.count(EntityKind::CustomerApplications).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_run_reports_both_steps() {
    let (store, docs) = setup().await;

    let run = MaintenanceSyncer::new(&store, &docs).run(24, 1).await;

    let entities: Vec<EntityKind> = run.steps.iter().map(|s| s.entity).collect();
    assert_eq!(
        entities,
        vec![EntityKind::UserActivities, EntityKind::CustomerApplications]
    );
    assert_eq!(run.exit_code(), 0);
}

#[tokio::test]
async fn test_out_of_range_window_aborts_without_touching_data() {
    let (store, docs) = setup().await;
    let now = datetime::now();

    let alice_id = store.users().insert(&alice(), now).await.unwrap();
    store
        .activities()
        .insert(alice_id, &activity("kept", 1), now)
        .await
        .unwrap();

    let run = MaintenanceSyncer::new(&store, &docs)
        .run(u32::MAX, u32::MAX)
        .await;

    assert_eq!(run.steps.len(), 2);
    assert!(run.steps.iter().all(|s| s.aborted.is_some()));
    assert_eq!(run.exit_code(), 2);
    assert_eq!(store.activities().count().await.unwrap(), 1);
    assert!(check_windows(u32::MAX, 1).is_err());
}
