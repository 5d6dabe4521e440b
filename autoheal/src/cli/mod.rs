//! CLI module for autoheal
//!
//! Provides the command-line interface for the monitor.

pub mod check;

use clap::{Parser, Subcommand};

/// autoheal - Health check monitor with automatic redeployment
#[derive(Parser, Debug)]
#[command(name = "autoheal")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    HEALTH_CHECK_URL                Health endpoint to poll (required)
    SLACK_WEBHOOK_URL               Incoming webhook for alerts (required)
    DEPLOYMENT_URL                  Deploy hook triggered on failure (required)
    ENV                             Environment label (default: dev)
    AUTOHEAL_CHECK_INTERVAL_SECS    Check interval (default: 30)
    AUTOHEAL_RECHECK_DELAY_SECS     Re-check delay after deployment (default: 120)
    AUTOHEAL_HEALTH_TIMEOUT_SECS    Health check timeout (default: 10)
    AUTOHEAL_DEPLOY_TIMEOUT_SECS    Deploy hook timeout (default: 30)
    AUTOHEAL_WEBHOOK_TIMEOUT_SECS   Webhook timeout (default: 10)
    AUTOHEAL_LOG_LEVEL              Log level when RUST_LOG is unset (default: info)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start monitoring (default)
    Run,
    /// Run a single health check and exit (no alerts, no deployment)
    Check,
    /// Print the resolved configuration and exit
    Config,
}
