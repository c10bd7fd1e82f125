//! Verify command handler

use crate::config::Config;
use crate::sync::{VerifyReport, verify};

pub async fn cmd_verify(config: &Config, strict: bool, json: bool) -> anyhow::Result<u8> {
    let (store, documents) = super::connect(config).await?;

    let report = verify(&store, &documents).await;

    if json {
        super::print_json(&report)?;
    } else {
        print_verify(&report);
    }

    documents.shutdown().await;
    Ok(report.exit_code(strict))
}

pub(super) fn print_verify(report: &VerifyReport) {
    let show = |n: Option<u64>| n.map_or_else(|| "?".to_string(), |n| n.to_string());

    println!("{:<24} {:>10} {:>10}  STATUS", "ENTITY", "SQLITE", "MONGODB");
    println!("{:-<56}", "");
    for row in &report.rows {
        let status = match &row.error {
            Some(e) => format!("error: {e}"),
            None if row.matches() => "ok".to_string(),
            None => "MISMATCH".to_string(),
        };
        println!(
            "{:<24} {:>10} {:>10}  {}",
            row.entity.as_str(),
            show(row.relational),
            show(row.document),
            status
        );
    }

    if report.is_consistent() {
        println!("\nAll counts match.");
    } else {
        println!("\n{} entity type(s) differ.", report.mismatches().count());
    }
}
