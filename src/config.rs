//! Command line and environment configuration.
//!
//! `main` loads `.env` first, so every flag below can also come from the
//! process environment or that file.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./finance_dashboard.db";

/// Financial reporting dashboard backend.
///
/// Examples:
///   finance-dashboard
///   finance-dashboard serve --bind 0.0.0.0:8080 --push-interval-secs 60
///   finance-dashboard migrate
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite connection string
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[command(flatten)]
    pub serve: ServeArgs,

    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run migrations, then serve the HTTP and WebSocket API (default)
    Serve,
    /// Apply migrations and exit
    Migrate,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address the HTTP server listens on
    #[arg(
        long = "bind",
        global = true,
        env = "BIND_ADDR",
        default_value = "127.0.0.1:3000",
        value_name = "ADDR"
    )]
    pub bind_addr: SocketAddr,

    /// Push the dashboard to subscribers every N seconds
    #[arg(long, global = true, env = "PUSH_INTERVAL_SECS", value_name = "SECS")]
    pub push_interval_secs: Option<u64>,

    /// Messages buffered per realtime subscriber before it starts lagging
    #[arg(long, global = true, env = "BROADCAST_CAPACITY", default_value = "16", value_name = "COUNT")]
    pub broadcast_capacity: usize,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            push_interval_secs: None,
            broadcast_capacity: 16,
        }
    }
}

impl ServeArgs {
    /// `None` when unset or zero.
    pub fn push_interval(&self) -> Option<Duration> {
        self.push_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// No subcommand means `serve`.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
