pub mod cli;
pub mod config;
pub mod db;
pub mod document;
pub mod entities;
pub mod models;
pub mod services;
pub mod sync;

use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    // Reports go to stdout, so logs stay on stderr.
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(&config);
    match &config.source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    if !matches!(cli.command, Commands::Init) {
        config.validate()?;
    }

    let code = match cli.command {
        Commands::Migrate {
            keep_existing,
            json,
        } => cli::cmd_migrate(&config, keep_existing, json).await?,

        Commands::Sync { json } => cli::cmd_sync(&config, json).await?,

        Commands::Maintain { hours, days, json } => {
            cli::cmd_maintain(&config, hours, days, json).await?
        }

        Commands::Verify { strict, json } => cli::cmd_verify(&config, strict, json).await?,

        Commands::Seed => cli::cmd_seed(&config).await?,

        Commands::Init => cli::cmd_init()?,
    };

    if code != 0 {
        info!("Finished with exit code {}", code);
    }
    Ok(ExitCode::from(code))
}
