//! Windowed, incremental variants of the activity and application flows,
//! meant to run on a schedule between full syncs.

use super::datetime;
use super::error::SyncError;
use super::report::{Direction, Operation, RunReport, SkipReason, StepReport};
use super::syncer::{UserResolver, document_user_ids, insert_activities};
use crate::db::Store;
use crate::db::repositories::activity::ActivityRepository;
use crate::document::DocumentStore;
use crate::models::{ApplicationRecord, EntityKind};
use chrono::{Duration, NaiveDateTime};
use tracing::info;

/// Longest activity window, ten years.
pub const MAX_ACTIVITY_HOURS: u32 = 24 * 3650;
pub const MAX_BACKUP_DAYS: u32 = 3650;

/// Rejects empty windows and windows longer than the maxima.
pub fn check_windows(hours: u32, days: u32) -> Result<(), SyncError> {
    if hours == 0 || hours > MAX_ACTIVITY_HOURS {
        return Err(SyncError::InvalidWindow(format!(
            "activity window must be 1..={MAX_ACTIVITY_HOURS} hours, got {hours}"
        )));
    }
    if days == 0 || days > MAX_BACKUP_DAYS {
        return Err(SyncError::InvalidWindow(format!(
            "application window must be 1..={MAX_BACKUP_DAYS} days, got {days}"
        )));
    }
    Ok(())
}

fn window_start(captured_at: NaiveDateTime, span: Duration) -> Result<NaiveDateTime, SyncError> {
    captured_at
        .checked_sub_signed(span)
        .ok_or_else(|| SyncError::InvalidWindow(format!("{span} reaches before the earliest date")))
}

pub struct MaintenanceSyncer<'a, D: ?Sized> {
    store: &'a Store,
    documents: &'a D,
}

impl<'a, D> MaintenanceSyncer<'a, D>
where
    D: DocumentStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a Store, documents: &'a D) -> Self {
        Self { store, documents }
    }

    pub async fn run(&self, activity_hours: u32, application_days: u32) -> RunReport {
        let mut run = RunReport::new(Operation::Maintain);
        run.steps
            .push(self.sync_recent_activities(activity_hours).await);
        run.steps
            .push(self.backup_recent_applications(application_days).await);
        run
    }

    /// Replaces relational activities newer than the window with the
    /// document ones from the same window.
    pub async fn sync_recent_activities(&self, hours: u32) -> StepReport {
        let mut report =
            StepReport::new(EntityKind::UserActivities, Direction::DocumentToRelational);
        if let Err(e) = self.sync_recent_activities_inner(hours, &mut report).await {
            report.abort(&e);
        }
        report.log();
        report
    }

    async fn sync_recent_activities_inner(
        &self,
        hours: u32,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let cutoff = window_start(captured_at, Duration::hours(i64::from(hours)))?;
        info!(
            "Syncing activities since {} ({}h window)",
            datetime::to_relational(cutoff),
            hours
        );

        let docs = self
            .documents
            .find_since(
                EntityKind::UserActivities,
                "timestamp",
                datetime::to_document(cutoff),
            )
            .await?;

        let txn = self.store.begin().await?;
        let resolver = UserResolver::load(&txn, self.documents).await?;
        let activities = ActivityRepository::new(&txn);

        report.deleted = activities.delete_since(cutoff).await?;
        insert_activities(&activities, &resolver, &docs, captured_at, report).await;

        txn.commit().await?;
        Ok(())
    }

    /// Re-copies applications updated within the window. Does nothing when
    /// no relational application changed.
    pub async fn backup_recent_applications(&self, days: u32) -> StepReport {
        let mut report = StepReport::new(
            EntityKind::CustomerApplications,
            Direction::RelationalToDocument,
        );
        if let Err(e) = self.backup_recent_applications_inner(days, &mut report).await {
            report.abort(&e);
        }
        report.log();
        report
    }

    async fn backup_recent_applications_inner(
        &self,
        days: u32,
        report: &mut StepReport,
    ) -> Result<(), SyncError> {
        let captured_at = datetime::now();
        let cutoff = window_start(captured_at, Duration::days(i64::from(days)))?;
        info!(
            "Backing up applications updated since {} ({}d window)",
            datetime::to_relational(cutoff),
            days
        );

        let rows = self.store.applications().updated_since(cutoff).await?;
        if rows.is_empty() {
            return Ok(());
        }

        report.deleted = self
            .documents
            .delete_since(
                EntityKind::CustomerApplications,
                "updated_at",
                datetime::to_document(cutoff),
            )
            .await?;
        let reviewers = document_user_ids(self.store, self.documents).await?;

        for row in rows {
            let key = row.id.to_string();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_windows_bounds() {
        assert!(check_windows(24, 1).is_ok());
        assert!(check_windows(MAX_ACTIVITY_HOURS, MAX_BACKUP_DAYS).is_ok());
        assert!(check_windows(0, 1).is_err());
        assert!(check_windows(24, 0).is_err());
        assert!(check_windows(MAX_ACTIVITY_HOURS + 1, 1).is_err());
        assert!(matches!(
            check_windows(24, u32::MAX),
            Err(SyncError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_window_start_out_of_range() {
        let now = datetime::now();
        assert_eq!(
            window_start(now, Duration::hours(2)).unwrap(),
            now - Duration::hours(2)
        );
        assert!(window_start(now, Duration::hours(i64::from(u32::MAX))).is_err());
        assert!(window_start(now, Duration::days(i64::from(u32::MAX))).is_err());
    }
}
