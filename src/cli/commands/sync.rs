//! Bidirectional sync command handler

use crate::config::Config;
use crate::sync::Syncer;

pub async fn cmd_sync(config: &Config, json: bool) -> anyhow::Result<u8> {
    let (store, documents) = super::connect(config).await?;

    let report = Syncer::new(&store, &documents).run().await;

    if json {
        super::print_json(&report)?;
    } else {
        super::print_run(&report);
    }

    documents.shutdown().await;
    Ok(report.exit_code())
}
