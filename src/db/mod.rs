use crate::models::EntityKind;
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

use repositories::{
    activity::ActivityRepository, application::ApplicationRepository,
    assignment::AssignmentRepository, branch::BranchRepository, goods::GoodsRepository,
    user::UserRepository,
};

/// The relational side: a SQLite pool with the schema applied.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        let path_str = path_str.split('?').next().unwrap_or(path_str);
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & schema applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Starts the transaction a single sync step runs in.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.conn.begin().await
    }

    #[must_use]
    pub const fn users(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn branches(&self) -> BranchRepository<'_, DatabaseConnection> {
        BranchRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn goods(&self) -> GoodsRepository<'_, DatabaseConnection> {
        GoodsRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn assignments(&self) -> AssignmentRepository<'_, DatabaseConnection> {
        AssignmentRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn activities(&self) -> ActivityRepository<'_, DatabaseConnection> {
        ActivityRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn applications(&self) -> ApplicationRepository<'_, DatabaseConnection> {
        ApplicationRepository::new(&self.conn)
    }

    pub async fn count(&self, kind: EntityKind) -> Result<u64, DbErr> {
        match kind {
            EntityKind::Users => self.users().count().await,
            EntityKind::Branches => self.branches().count().await,
            EntityKind::Goods => self.goods().count().await,
            EntityKind::Assignments => self.assignments().count().await,
            EntityKind::UserActivities => self.activities().count().await,
            EntityKind::CustomerApplications => self.applications().count().await,
        }
    }
}
