//! CLI module - Command-line interface for stockhub-sync
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// StockHub data sync - keeps the SQLite and MongoDB stores in step
#[derive(Parser)]
#[command(name = "stockhub-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy every SQLite table into MongoDB, then index and verify
    Migrate {
        /// Keep existing MongoDB documents instead of clearing collections first
        #[arg(long)]
        keep_existing: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full bidirectional sync
    Sync {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Incremental sync of recent activities and applications
    #[command(alias = "maintenance")]
    Maintain {
        /// Activity window in hours (default from config)
        #[arg(long)]
        hours: Option<u32>,
        /// Application backup window in days (default from config)
        #[arg(long)]
        days: Option<u32>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare record counts between the two stores
    Verify {
        /// Exit with status 2 when any count differs
        #[arg(long)]
        strict: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Insert demo users, branches, goods and assignments into SQLite
    Seed,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
