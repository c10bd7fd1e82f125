//! Full migration command handler

use crate::config::Config;
use crate::sync::{MigrationOptions, run_full_migration};

pub async fn cmd_migrate(config: &Config, keep_existing: bool, json: bool) -> anyhow::Result<u8> {
    let (store, documents) = super::connect(config).await?;

    let report = run_full_migration(&store, &documents, MigrationOptions { keep_existing }).await?;

    if json {
        super::print_json(&report)?;
    } else {
        super::print_run(&report);
        if let Some(verification) = &report.verification {
            println!();
            super::verify::print_verify(verification);
        }
    }

    documents.shutdown().await;
    Ok(report.exit_code())
}
