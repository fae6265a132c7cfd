use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hirehub_common::Role;

/// HireHub worker client: accounts, availability, nearby-job alerts.
#[derive(Parser, Debug)]
#[command(name = "hirehub", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Account role (worker, owner, admin).
        #[arg(long, default_value = "WORKER")]
        role: Role,
    },
    /// Create an account and store its session token.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        /// Account role (worker, owner, admin).
        #[arg(long, default_value = "WORKER")]
        role: Role,
    },
    /// Forget the stored session.
    Logout,
    /// Show the stored session and effective config.
    Status,
    /// Open the worker dashboard.
    Run {
        /// Go available immediately.
        #[arg(long)]
        available: bool,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
