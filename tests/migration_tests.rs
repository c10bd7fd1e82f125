//! Integration tests for the full SQLite -> MongoDB migration, seeding and verification.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use bson::Bson;
use sea_orm::ConnectionTrait;
use stockhub_sync::config::SecurityConfig;
use stockhub_sync::db::Store;
use stockhub_sync::document::{DocumentStore, MemoryDocumentStore};
use stockhub_sync::models::{ActivityRecord, EntityKind, UserRef};
use stockhub_sync::services::seed::{SeedSummary, seed_demo_data};
use stockhub_sync::sync::{MigrationOptions, SkipReason, datetime, run_full_migration, verify};

async fn setup() -> (Store, MemoryDocumentStore) {
    let db_path = std::env::temp_dir().join(format!(
        "stockhub-migration-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open test database");

    (store, MemoryDocumentStore::new())
}

fn fast_hashing() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

fn password_matches(password: &str, hash: &str) -> bool {
    let parsed = PasswordHash::new(hash).unwrap();
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

async fn seeded() -> (Store, MemoryDocumentStore) {
    let (store, docs) = setup().await;
    seed_demo_data(&store, &fast_hashing())
        .await
        .expect("Failed to seed demo data");
    (store, docs)
}

#[tokio::test]
async fn test_seed_is_rerunnable() {
    let (store, _docs) = setup().await;

    let first = seed_demo_data(&store, &fast_hashing()).await.unwrap();
    assert_eq!(
        first,
        SeedSummary {
            users: 3,
            branches: 3,
            goods: 4,
            assignments: 2,
            activities: 3,
        }
    );

    let second = seed_demo_data(&store, &fast_hashing()).await.unwrap();
    assert_eq!(second, SeedSummary::default());
    assert_eq!(store.users().count().await.unwrap(), 3);
    assert_eq!(store.goods().count().await.unwrap(), 4);

    let employee = store
        .users()
        .get_by_username("employee1")
        .await
        .unwrap()
        .unwrap();
    assert!(password_matches("emp123", &employee.hashed_password));
    assert!(!password_matches("wrong", &employee.hashed_password));
    assert!(
        store
            .users()
            .get_by_username("nobody")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_full_migration_copies_everything() {
    let (store, docs) = seeded().await;

    let run = run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();

    assert!(run.is_clean());
    assert_eq!(run.exit_code(), 0);
    assert_eq!(run.steps.len(), 6);

    let verification = run.verification.as_ref().unwrap();
    assert!(verification.is_consistent());
    assert_eq!(
        verification.row(EntityKind::Goods).unwrap().document,
        Some(4)
    );

    let users = docs.find_all(EntityKind::Users).await.unwrap();
    let customer = users
        .iter()
        .find(|u| u.get_str("username").ok() == Some("customer1"))
        .unwrap();
    let customer_oid = customer.get_object_id("_id").unwrap();
    let customer_row = store
        .users()
        .get_by_username("customer1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.get_i32("sqlite_id").unwrap(), customer_row.id);
    assert!(customer.get_datetime("created_at").is_ok());

    let goods = docs.find_all(EntityKind::Goods).await.unwrap();
    assert!(
        goods
            .iter()
            .all(|g| g.get_object_id("owner_id").ok() == Some(customer_oid))
    );
    assert!(goods.iter().all(|g| g.get_i32("branch_id").is_ok()));

    let activities = docs.find_all(EntityKind::UserActivities).await.unwrap();
    assert_eq!(activities.len(), 3);
    assert!(activities.iter().all(|a| a.get_object_id("user_id").is_ok()));

    let assignments = docs.find_all(EntityKind::Assignments).await.unwrap();
    assert!(
        assignments
            .iter()
            .all(|a| a.get_str("status").ok() == Some("pending"))
    );
}

#[tokio::test]
async fn test_migration_clears_existing_documents() {
    let (store, docs) = seeded().await;

    run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();
    let run = run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();

    assert!(run.is_clean());
    assert!(run.verification.unwrap().is_consistent());
    assert_eq!(docs.count(EntityKind::Users).await.unwrap(), 3);
}

#[tokio::test]
async fn test_keep_existing_reuses_document_users() {
    let (store, docs) = seeded().await;

    run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();
    let run = run_full_migration(
        &store,
        &docs,
        MigrationOptions {
            keep_existing: true,
        },
    )
    .await
    .unwrap();

    // Unique username/email indexes reject the second copy of every user.
    let users = run.step(EntityKind::Users).unwrap();
    assert_eq!(users.failed.len(), 3);
    assert_eq!(run.exit_code(), 2);

    let activities = run.step(EntityKind::UserActivities).unwrap();
    assert_eq!(activities.inserted, 3);
    assert!(activities.skipped.is_empty());

    assert_eq!(docs.count(EntityKind::Goods).await.unwrap(), 8);
    assert!(!run.verification.unwrap().is_consistent());
}

#[tokio::test]
async fn test_activity_of_unknown_user_is_skipped() {
    let (store, docs) = seeded().await;

    let orphan = ActivityRecord {
        user: UserRef::Relational(999),
        action: "login".to_string(),
        description: None,
        category: None,
        ip_address: None,
        user_agent: None,
        timestamp: None,
    };
    store
        .activities()
        .insert(999, &orphan, datetime::now())
        .await
        .unwrap();

    let run = run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();

    let step = run.step(EntityKind::UserActivities).unwrap();
    assert_eq!(step.inserted, 3);
    assert_eq!(
        step.skipped[0].reason,
        SkipReason::UnresolvedUser("999".to_string())
    );
    assert_eq!(run.exit_code(), 0);

    let verification = run.verification.unwrap();
    let row = verification.row(EntityKind::UserActivities).unwrap();
    assert_eq!((row.relational, row.document), (Some(4), Some(3)));
    assert_eq!(verification.exit_code(true), 2);
    assert_eq!(verification.exit_code(false), 0);
}

#[tokio::test]
async fn test_unparseable_timestamp_defaults_to_capture_time() {
    let (store, docs) = setup().await;

    store
        .conn
        .execute_unprepared(
            "INSERT INTO branches (name, location, created_at) VALUES ('Depot', 'Leeds', 'soon')",
        )
        .await
        .unwrap();

    let before = bson::DateTime::from_chrono(chrono::Utc::now() - chrono::Duration::seconds(1));
    let run = run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();
    assert!(run.is_clean());

    let branches = docs.find_all(EntityKind::Branches).await.unwrap();
    let created = branches[0].get_datetime("created_at").unwrap();
    assert!(*created >= before);
    assert_eq!(branches[0].get("manager_id"), Some(&Bson::Null));
}

#[tokio::test]
async fn test_aborted_step_stops_the_run() {
    let (store, docs) = seeded().await;

    store
        .conn
        .execute_unprepared("DROP TABLE goods")
        .await
        .unwrap();

    let run = run_full_migration(&store, &docs, MigrationOptions::default())
        .await
        .unwrap();

    let attempted: Vec<EntityKind> = run.steps.iter().map(|s| s.entity).collect();
    assert_eq!(
        attempted,
        vec![EntityKind::Users, EntityKind::Branches, EntityKind::Goods]
    );
    assert!(run.step(EntityKind::Goods).unwrap().aborted.is_some());
    assert!(run.verification.is_none());
    assert_eq!(run.exit_code(), 2);

    assert_eq!(docs.count(EntityKind::Users).await.unwrap(), 3);
    assert_eq!(docs.count(EntityKind::Assignments).await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_records_count_errors_per_entity() {
    let (store, docs) = seeded().await;

    store
        .conn
        .execute_unprepared("DROP TABLE assignments")
        .await
        .unwrap();

    let report = verify(&store, &docs).await;

    assert_eq!(report.rows.len(), 6);
    let broken = report.row(EntityKind::Assignments).unwrap();
    assert!(broken.error.is_some());
    assert_eq!(broken.relational, None);
    assert_eq!(broken.document, Some(0));

    let users = report.row(EntityKind::Users).unwrap();
    assert_eq!((users.relational, users.document), (Some(3), Some(0)));
    assert!(!report.is_consistent());
}
