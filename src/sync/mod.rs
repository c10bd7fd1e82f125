//! Cross-store migration and synchronization.

pub mod datetime;
pub mod error;
pub mod identity;
pub mod maintenance;
pub mod migrator;
pub mod report;
pub mod syncer;
pub mod verify;

pub use error::SyncError;
pub use identity::IdentityMap;
pub use maintenance::{MAX_ACTIVITY_HOURS, MAX_BACKUP_DAYS, MaintenanceSyncer, check_windows};
pub use migrator::{MigrationOptions, TableMigrator, run_full_migration};
pub use report::{Direction, RunReport, SkipReason, StepReport};
pub use syncer::Syncer;
pub use verify::{VerifyReport, verify};
