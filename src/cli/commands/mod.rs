mod init;
mod maintain;
mod migrate;
mod seed;
mod sync;
mod verify;

pub use init::cmd_init;
pub use maintain::cmd_maintain;
pub use migrate::cmd_migrate;
pub use seed::cmd_seed;
pub use sync::cmd_sync;
pub use verify::cmd_verify;

use anyhow::Context;
use serde::Serialize;

use crate::config::Config;
use crate::db::Store;
use crate::document::MongoStore;
use crate::sync::RunReport;

/// Opens both stores and checks they answer. Any failure here is fatal.
async fn connect(config: &Config) -> anyhow::Result<(Store, MongoStore)> {
    let store = open_relational(config).await?;

    let documents = MongoStore::connect(&config.mongodb)
        .await
        .with_context(|| format!("Failed to connect to MongoDB at {}", config.mongodb.url))?;

    Ok((store, documents))
}

async fn open_relational(config: &Config) -> anyhow::Result<Store> {
    let store = Store::with_pool_options(
        &config.sqlite.database_path,
        config.sqlite.max_connections,
        config.sqlite.min_connections,
    )
    .await
    .with_context(|| format!("Failed to open SQLite at {}", config.sqlite.database_path))?;
    store.ping().await.context("SQLite did not answer ping")?;
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_run(report: &RunReport) {
    println!(
        "{:<24} {:<18} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "ENTITY", "DIRECTION", "INSERTED", "UPDATED", "DELETED", "SKIPPED", "FAILED"
    );
    println!("{:-<90}", "");

    for step in &report.steps {
        println!(
            "{:<24} {:<18} {:>8} {:>8} {:>8} {:>8} {:>8}",
            step.entity.as_str(),
            step.direction.to_string(),
            step.inserted,
            step.updated,
            step.deleted,
            step.skipped.len(),
            step.failed.len()
        );
        if let Some(reason) = &step.aborted {
            println!("  aborted: {reason}");
        }
        for failed in &step.failed {
            println!("  failed {}: {}", failed.key, failed.error);
        }
    }
}
