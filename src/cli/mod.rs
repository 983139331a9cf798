//! Command-line interface for picfeed.

mod commands;

use clap::{Parser, Subcommand};

/// Picfeed - photo sharing API server
#[derive(Parser)]
#[command(name = "picfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a user with email and password credentials
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        /// Defaults to one derived from the email
        #[arg(long)]
        username: Option<String>,
    },

    /// Show recent persisted error logs
    Logs {
        #[arg(long, default_value = "20")]
        limit: u64,
        /// AUTH, DATABASE, S3_STORAGE, API, CLIENT or VALIDATION
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete persisted error logs older than the given number of days
    PruneLogs {
        #[arg(long, default_value = "30")]
        days: i64,
    },
}

pub use commands::*;
