//! Policy-directed bidirectional sync.
//!
//! Every entity type has one fixed direction:
//!
//! | entity                 | direction          |
//! |------------------------|--------------------|
//! | users, user activities | mongodb -> sqlite  |
//! | goods, applications    | sqlite -> mongodb  |
//! | branches, assignments  | not synced         |
//!
//! Steps are independent. A step that aborts is reported and the next one
//! still runs.

use super::datetime;
use super::error::SyncError;
use super::identity::IdentityMap;
use super::report::{Direction, Operation, RunReport, SkipReason, StepReport};
use crate::db::Store;
use crate::db::repositories::{activity::ActivityRepository, user::UserRepository};
use crate::document::{DocumentStore, fields};
use crate::models::{
    ActivityRecord, ApplicationRecord, EntityKind, GoodsRecord, UserRecord, UserRef, user,
};
use bson::{Document, oid::ObjectId};
use chrono::NaiveDateTime;
use sea_orm::ConnectionTrait;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Resolves document-side user references to relational user ids.
pub struct UserResolver {
    by_object_id: IdentityMap<ObjectId, i32>,
    by_username: HashMap<String, i32>,
}

impl UserResolver {
    /// Correlates document users with relational users by username.
    pub async fn load<C, D>(conn: &C, documents: &D) -> Result<Self, SyncError>
    where
        C: ConnectionTrait,
        D: DocumentStore + ?Sized,
    {
        let user_docs = documents.find_all(EntityKind::Users).await?;
        let by_username: HashMap<String, i32> = UserRepository::new(conn)
            .username_ids()
            .await?
            .into_iter()
            .collect();

        let by_object_id = IdentityMap::build(
            by_username.iter().map(|(name, id)| (name.clone(), *id)),
            user_docs.iter().filter_map(user::document_key),
        );
        debug!(
            "Resolved {} document users, {} without a relational match",
            by_object_id.len(),
            by_object_id.skipped().len()
        );

        Ok(Self {
            by_object_id,
            by_username,
        })
    }

    #[must_use]
    pub fn resolve(&self, user: &UserRef) -> Option<i32> {
        match user {
            UserRef::Document(id) => self.by_object_id.resolve(id).copied(),
            UserRef::Username(name) => self.by_username.get(name).copied(),
            // Document activities never carry relational keys.
            UserRef::Relational(_) => None,
        }
    }
}

fn describe(user: &UserRef) -> String {
    match user {
        UserRef::Relational(id) => id.to_string(),
        UserRef::Document(id) => id.to_hex(),
        UserRef::Username(name) => name.clone(),
    }
}

/// Report key for a document: its `_id` when it has one.
pub(crate) fn document_label(doc: &Document) -> String {
    fields::object_id(doc).map_or_else(|_| "<no _id>".to_string(), |id| id.to_hex())
}

/// Inserts document activities into the relational store, re-resolving each
/// owner. Unresolvable owners are skipped.
pub(crate) async fn insert_activities<C>(
    activities: &ActivityRepository<'_, C>,
    resolver: &UserResolver,
    docs: &[Document],
    captured_at: NaiveDateTime,
    report: &mut StepReport,
) where
    C: ConnectionTrait,
{
    for doc in docs {
        let key = document_label(doc);
        let record = match ActivityRecord::from_document(doc) {
            Ok(record) => record,
            Err(e) => {
                report.skip(key, SkipReason::Invalid(e));
                continue;
            }
        };

        let Some(user_id) = resolver.resolve(&record.user) else {
            report.skip(key, SkipReason::UnresolvedUser(describe(&record.user)));
            continue;
        };

        match activities.insert(user_id, &record, captured_at).await {
            Ok(_) => report.inserted += 1,
            Err(e) => report.fail(key, e),
        }
    }
}

/// Relational user id -> document `_id`, correlated by username.
pub(crate) async fn document_user_ids<D>(
    store: &Store,
    documents: &D,
) -> Result<IdentityMap<i32, ObjectId>, SyncError>
where
    D: DocumentStore + ?Sized,
{
    let user_docs = documents.find_all(EntityKind::Users).await?;
    let user_rows = store.users().username_ids().await?;

    Ok(IdentityMap::build(
        user_docs.iter().filter_map(user::document_key),
        user_rows,
    ))
}

pub struct Syncer<'a, D: ?Sized> {
    store: &'a Store,
    documents: &'a D,
}

impl<'a, D> Syncer<'a, D>
where
    D: DocumentStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a Store, documents: &'a D) -> Self {
        Self { store, documents }
    }

    /// Users, activities, goods, applications, in that order.
    pub async fn run(&self) -> RunReport {
        info!("Starting bidirectional sync");

        let mut run = RunReport::new(Operation::Sync);
        run.steps.push(self.sync_users().await);
        run.steps.push(self.sync_activities().await);
        run.steps.push(self.sync_goods().await);
        run.steps.push(self.sync_applications().await);

        info!("Sync finished ({})", if run.is_clean() { "clean" } else { "with errors" });
        run
    }

    fn finish(mut report: StepReport, result: Result<(), SyncError>) -> StepReport {
        if let Err(e) = result {
            report.abort(&e);
        }
        report.log();
        report
    }

    /// Document users overwrite relational users with the same username;
    /// unknown usernames are inserted. Relational-only users are untouched.
    pub async fn sync_users(&self) -> StepReport {
        let mut report = StepReport::new(EntityKind::Users, Direction::DocumentToRelational);
        let result = self.sync_users_inner(&mut report).await;
        Self::finish(report, result)
    }

    async fn sync_users_inner(&self, report: &mut StepReport) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let docs = self.documents.find_all(EntityKind::Users).await?;

        let txn = self.store.begin().await?;
        let users = UserRepository::new(&txn);

        for doc in &docs {
            let key = fields::optional_str(doc, "username").unwrap_or_else(|| document_label(doc));
            let record = match UserRecord::from_document(doc) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            match users.get_by_username(&record.username).await? {
                Some(existing) => match users.overwrite(existing, &record).await {
                    Ok(()) => report.updated += 1,
                    Err(e) => report.fail(key, e),
                },
                None => match users.insert(&record, captured_at).await {
                    Ok(id) => {
                        debug!("Inserted user {} as id {}", record.username, id);
                        report.inserted += 1;
                    }
                    Err(e) => report.fail(key, e),
                },
            }
        }

        txn.commit().await?;
        Ok(())
    }

    /// Replaces the relational activity log with the document one.
    pub async fn sync_activities(&self) -> StepReport {
        let mut report =
            StepReport::new(EntityKind::UserActivities, Direction::DocumentToRelational);
        let result = self.sync_activities_inner(&mut report).await;
        Self::finish(report, result)
    }

    async fn sync_activities_inner(&self, report: &mut StepReport) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let docs = self.documents.find_all(EntityKind::UserActivities).await?;

        let txn = self.store.begin().await?;
        let resolver = UserResolver::load(&txn, self.documents).await?;
        let activities = ActivityRepository::new(&txn);

        report.deleted = activities.delete_all().await?;
        insert_activities(&activities, &resolver, &docs, captured_at, report).await;

        txn.commit().await?;
        Ok(())
    }

    /// Copies relational goods whose name is not yet in the document store.
    pub async fn sync_goods(&self) -> StepReport {
        let mut report = StepReport::new(EntityKind::Goods, Direction::RelationalToDocument);
        let result = self.sync_goods_inner(&mut report).await;
        Self::finish(report, result)
    }

    async fn sync_goods_inner(&self, report: &mut StepReport) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let mut names: HashSet<String> = self
            .documents
            .find_all(EntityKind::Goods)
            .await?
            .iter()
            .filter_map(|doc| fields::optional_str(doc, "name"))
            .collect();
        let owners = document_user_ids(self.store, self.documents).await?;

        for row in self.store.goods().list().await? {
            let key = row.id.to_string();
            let record = match GoodsRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            if names.contains(&record.name) {
                report.skip(key, SkipReason::AlreadyPresent);
                continue;
            }

            let owner = owners.resolve_opt(record.owner_id.as_ref());
            let doc = record.to_document(owner, Some(row.id), captured_at);
            match self.documents.insert_one(EntityKind::Goods, doc).await {
                Ok(_) => {
                    names.insert(record.name);
                    report.inserted += 1;
                }
                Err(e) => report.fail(key, e),
            }
        }

        Ok(())
    }

    /// Copies relational applications that have no document with their `sqlite_id`.
    pub async fn sync_applications(&self) -> StepReport {
        let mut report = StepReport::new(
            EntityKind::CustomerApplications,
            Direction::RelationalToDocument,
        );
        let result = self.sync_applications_inner(&mut report).await;
        Self::finish(report, result)
    }

    async fn sync_applications_inner(&self, report: &mut StepReport) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let present: HashSet<i32> = self
            .documents
            .find_all(EntityKind::CustomerApplications)
            .await?
            .iter()
            .filter_map(|doc| fields::optional_i32(doc, "sqlite_id"))
            .collect();
        let reviewers = document_user_ids(self.store, self.documents).await?;

        for row in self.store.applications().list().await? {
            let key = row.id.to_string();
            if present.contains(&row.id) {
                report.skip(key, SkipReason::AlreadyPresent);
                continue;
            }

            let record = match ApplicationRecord::from_row(&row) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(key, SkipReason::Invalid(e));
                    continue;
                }
            };

            let reviewer = reviewers.resolve_opt(record.reviewed_by.as_ref());
            let doc = record.to_document(reviewer, Some(row.id), captured_at);
            match self
                .documents
                .insert_one(EntityKind::CustomerApplications, doc)
                .await
            {
                Ok(_) => report.inserted += 1,
                Err(e) => report.fail(key, e),
            }
        }

        Ok(())
    }
}
