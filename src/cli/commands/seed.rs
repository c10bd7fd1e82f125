//! Seed command handler

use crate::config::Config;
use crate::services::seed::seed_demo_data;

pub async fn cmd_seed(config: &Config) -> anyhow::Result<u8> {
    let store = super::open_relational(config).await?;
    let summary = seed_demo_data(&store, &config.security).await?;

    if summary == Default::default() {
        println!("Demo data already present, nothing to do.");
    } else {
        println!(
            "Seeded {} users, {} branches, {} goods, {} assignments, {} activities.",
            summary.users, summary.branches, summary.goods, summary.assignments, summary.activities
        );
        println!();
        println!("Demo logins: admin/admin123, employee1/emp123, customer1/cust123");
    }

    Ok(0)
}
