//! Maintenance sync command handler

use crate::config::Config;
use crate::sync::{MaintenanceSyncer, check_windows};

pub async fn cmd_maintain(
    config: &Config,
    hours: Option<u32>,
    days: Option<u32>,
    json: bool,
) -> anyhow::Result<u8> {
    let hours = hours.unwrap_or(config.sync.recent_activity_hours);
    let days = days.unwrap_or(config.sync.application_backup_days);
    check_windows(hours, days)?;

    let (store, documents) = super::connect(config).await?;

    let report = MaintenanceSyncer::new(&store, &documents)
        .run(hours, days)
        .await;

    if json {
        super::print_json(&report)?;
    } else {
        super::print_run(&report);
    }

    documents.shutdown().await;
    Ok(report.exit_code())
}
