//! One-way bulk copy from SQLite into MongoDB.
//!
//! Each table is read whole, converted row by row into a typed record and
//! inserted one document at a time with a `sqlite_id` back-reference. Users
//! go first so later tables can rewrite their user keys to the new `_id`s.

use super::datetime;
use super::error::SyncError;
use super::identity::IdentityMap;
use super::report::{Direction, Operation, RunReport, SkipReason, StepReport};
use super::verify;
use crate::db::Store;
use crate::document::{DocumentStore, IndexSpec};
use crate::models::{
    ActivityRecord, ApplicationRecord, AssignmentRecord, BranchRecord, EntityKind, GoodsRecord,
    UserRecord, user,
};
use bson::oid::ObjectId;
use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Migration order. Users first; activities must follow users.
pub const MIGRATION_ORDER: [EntityKind; 6] = [
    EntityKind::Users,
    EntityKind::Branches,
    EntityKind::Goods,
    EntityKind::Assignments,
    EntityKind::UserActivities,
    EntityKind::CustomerApplications,
];

/// Indexes created once all collections are populated.
#[must_use]
pub fn indexes_for(kind: EntityKind) -> &'static [IndexSpec] {
    const USERS: [IndexSpec; 4] = [
        IndexSpec::unique("username"),
        IndexSpec::unique("email"),
        IndexSpec::plain("role"),
        IndexSpec::plain("sqlite_id"),
    ];
    const BRANCHES: [IndexSpec; 2] = [IndexSpec::plain("name"), IndexSpec::plain("sqlite_id")];
    const GOODS: [IndexSpec; 3] = [
        IndexSpec::plain("name"),
        IndexSpec::plain("category"),
        IndexSpec::plain("sqlite_id"),
    ];
    const ASSIGNMENTS: [IndexSpec; 3] = [
        IndexSpec::plain("status"),
        IndexSpec::plain("priority"),
        IndexSpec::plain("sqlite_id"),
    ];
    const ACTIVITIES: [IndexSpec; 4] = [
        IndexSpec::plain("user_id"),
        IndexSpec::plain("timestamp"),
        IndexSpec::plain("category"),
        IndexSpec::plain("sqlite_id"),
    ];
    const APPLICATIONS: [IndexSpec; 3] = [
        IndexSpec::plain("status"),
        IndexSpec::plain("email"),
        IndexSpec::plain("sqlite_id"),
    ];

    match kind {
        EntityKind::Users => &USERS,
        EntityKind::Branches => &BRANCHES,
        EntityKind::Goods => &GOODS,
        EntityKind::Assignments => &ASSIGNMENTS,
        EntityKind::UserActivities => &ACTIVITIES,
        EntityKind::CustomerApplications => &APPLICATIONS,
    }
}

/// Copies tables one at a time, carrying the user key mapping between them.
pub struct TableMigrator<'a, D: ?Sized> {
    store: &'a Store,
    documents: &'a D,
    users: IdentityMap<i32, ObjectId>,
}

impl<'a, D> TableMigrator<'a, D>
where
    D: DocumentStore + ?Sized,
{
    #[must_use]
    pub fn new(store: &'a Store, documents: &'a D) -> Self {
        Self {
            store,
            documents,
            users: IdentityMap::new(),
        }
    }

    /// Seeds the user mapping from users already in the document store, for
    /// runs that keep existing collections.
    pub async fn adopt_existing_users(&mut self) -> Result<(), SyncError> {
        let existing = self.documents.find_all(EntityKind::Users).await?;
        let rows = self.store.users().username_ids().await?;
        self.users = IdentityMap::build(existing.iter().filter_map(user::document_key), rows);
        info!("Adopted {} existing document users", self.users.len());
        Ok(())
    }

    pub async fn migrate(&mut self, kind: EntityKind) -> StepReport {
        let captured_at = datetime::now();
        let mut report = StepReport::new(kind, Direction::RelationalToDocument);

        let result = match kind {
            EntityKind::Users => self.migrate_users(captured_at, &mut report).await,
            EntityKind::Branches => self.migrate_branches(captured_at, &mut report).await,
            EntityKind::Goods => self.migrate_goods(captured_at, &mut report).await,
            EntityKind::Assignments => self.migrate_assignments(captured_at, &mut report).await,
            EntityKind::UserActivities => self.migrate_activities(captured_at, &mut report).await,
            EntityKind::CustomerApplications => {
                self.migrate_applications(captured_at, &mut report).await
            }
        };

        if let Err(e) = result {
            report.abort(&e);
        }
        report.log();
        report
    }

    async fn migrate_users(
        &mut self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.users().list().await? {
            let key = row.id.to_string();
            let record = match UserRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let doc = record.to_document(Some(row.id), captured_at);
            match self.documents.insert_one(EntityKind::Users, doc).await {
                Ok(id) => {
                    self.users.record(row.id, id);
                    report.inserted += 1;
                }
                Err(e) => report.fail(key, e),
            }
        }
        Ok(())
    }

    async fn migrate_branches(
        &self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.branches().list().await? {
            let key = row.id.to_string();
            let record = match BranchRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let manager = self.users.resolve_opt(record.manager_id.as_ref());
            let doc = record.to_document(manager, Some(row.id), captured_at);
            self.insert(EntityKind::Branches, key, doc, report).await;
        }
        Ok(())
    }

    async fn migrate_goods(
        &self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.goods().list().await? {
            let key = row.id.to_string();
            let record = match GoodsRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let owner = self.users.resolve_opt(record.owner_id.as_ref());
            let doc = record.to_document(owner, Some(row.id), captured_at);
            self.insert(EntityKind::Goods, key, doc, report).await;
        }
        Ok(())
    }

    async fn migrate_assignments(
        &self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.assignments().list().await? {
            let key = row.id.to_string();
            let record = match AssignmentRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let employee = self.users.resolve_opt(record.employee_id.as_ref());
            let doc = record.to_document(employee, Some(row.id), captured_at);
            self.insert(EntityKind::Assignments, key, doc, report).await;
        }
        Ok(())
    }

    /// Activities whose user was not migrated are skipped rather than orphaned.
    async fn migrate_activities(
        &self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.activities().list().await? {
            let key = row.id.to_string();
            let record = match ActivityRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let Some(user) = self.users.resolve(&row.user_id).copied() else {
                report.skip(key, SkipReason::UnresolvedUser(row.user_id.to_string()));
                continue;
            };

            let doc = record.to_document(user, Some(row.id), captured_at);
            self.insert(EntityKind::UserActivities, key, doc, report).await;
        }
        Ok(())
    }

    async fn migrate_applications(
        &self,
        captured_at: NaiveDateTime,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        for row in self.store.applications().list().await? {
            let key = row.id.to_string();
            let record = match ApplicationRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let reviewer = self.users.resolve_opt(record.reviewed_by.as_ref());
            let doc = record.to_document(reviewer, Some(row.id), captured_at);
            self.insert(EntityKind::CustomerApplications, key, doc, report)
                .await;
        }
        Ok(())
    }

    async fn insert(
        &self,
        kind: EntityKind,
        key: String,
        doc: bson::Document,
        report: &mut StepReport,
    ) {
        match self.documents.insert_one(kind, doc).await {
            Ok(_) => report.inserted += 1,
            Err(e) => report.fail(key, e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Leave existing documents in place instead of clearing collections first.
    pub keep_existing: bool,
}

/// Full relational -> document migration.
///
/// Clears the six collections (unless `keep_existing`), migrates them in
/// [`MIGRATION_ORDER`], creates indexes and finishes with a count check.
/// A step that aborts stops the run: earlier steps stay written, later ones
/// are not attempted, and no indexes or verification follow.
///
/// Only the clearing phase can fail the whole call.
pub async fn run_full_migration<D>(
    store: &Store,
    documents: &D,
    options: MigrationOptions,
) -> Result<RunReport, SyncError>
where
    D: DocumentStore + ?Sized,
{
    info!("Starting full migration sqlite -> mongodb");

    let mut migrator = TableMigrator::new(store, documents);
    if options.keep_existing {
        migrator.adopt_existing_users().await?;
    } else {
        for kind in MIGRATION_ORDER {
            let removed = documents.delete_all(kind).await?;
            if removed > 0 {
                info!("Cleared {} documents from {}", removed, kind);
            }
        }
    }

    let mut run = RunReport::new(Operation::Migrate);
    for kind in MIGRATION_ORDER {
        let step = migrator.migrate(kind).await;
        let aborted = step.aborted.is_some();
        run.steps.push(step);
        if aborted {
            warn!("Migration stopped after {} step aborted", kind);
            return Ok(run);
        }
    }

    create_indexes(documents).await;
    run.verification = Some(verify::verify(store, documents).await);

    info!("Migration finished ({})", if run.is_clean() { "clean" } else { "with errors" });
    Ok(run)
}

/// Index failures are logged and otherwise ignored.
pub async fn create_indexes<D>(documents: &D)
where
    D: DocumentStore + ?Sized,
{
    for kind in MIGRATION_ORDER {
        for index in indexes_for(kind) {
            if let Err(e) = documents.create_index(kind, *index).await {
                warn!("Failed to create index {}.{}: {}", kind, index.field, e);
            }
        }
    }
}
