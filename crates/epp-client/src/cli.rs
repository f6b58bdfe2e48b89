//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use epp_core::TracingConfig;
use tracing::Level;

/// eppctl - talk EPP to a domain registry
#[derive(Debug, Parser)]
#[command(name = "eppctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "EPPCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server section to use (defaults to `default_server`)
    #[arg(long, short, global = true, env = "EPPCTL_SERVER")]
    pub server: Option<String>,

    /// Render and log commands without sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug output (request and response bodies)
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Append logs to this file as JSON lines instead of stderr
    #[arg(long, global = true, env = "EPPCTL_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Logging setup for this invocation.
    ///
    /// `--debug` keeps the pretty debug output and sends it to the log file
    /// when one is given. A log file alone switches to JSON lines at debug
    /// level for unattended runs.
    pub fn tracing_config(&self) -> TracingConfig {
        match (self.debug, &self.log_file) {
            (true, Some(path)) => TracingConfig::cli_debug().with_log_file(path),
            (true, None) => TracingConfig::cli_debug(),
            (false, Some(path)) => TracingConfig::unattended(path),
            (false, None) => TracingConfig::default().with_level(Level::INFO),
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the server and print its greeting
    Hello,

    /// Log in and out, optionally changing the password
    Login {
        /// New password to set at login
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Contact commands
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// Domain commands
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Service message queue commands
    Poll {
        #[command(subcommand)]
        action: PollAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Contact actions.
#[derive(Debug, Subcommand)]
pub enum ContactAction {
    /// Check whether handles are available
    Check {
        #[arg(required = true)]
        handles: Vec<String>,
    },

    /// Create a contact from a configured fixture
    Create {
        /// Fixture name under `[fixtures.contacts]`
        fixture: String,
    },

    /// Show a contact
    Info { handle: String },

    /// Delete a contact
    Delete { handle: String },
}

/// Domain actions.
#[derive(Debug, Subcommand)]
pub enum DomainAction {
    /// Check whether names are available
    Check {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Create a domain from a configured fixture
    Create {
        /// Fixture name under `[fixtures.domains]`
        fixture: String,
    },

    /// Show a domain
    Info {
        name: String,

        /// authInfo, for domains held by another registrar
        #[arg(long)]
        auth_info: Option<String>,
    },

    /// Delete a domain
    Delete { name: String },

    /// Run a transfer operation
    Transfer {
        name: String,

        /// request, cancel, approve, reject or query
        op: String,

        /// authInfo of the domain
        #[arg(long)]
        auth_info: Option<String>,

        /// Change the registrant along with the transfer
        #[arg(long)]
        new_registrant: Option<String>,

        /// New authInfo set by the registrant change
        #[arg(long, requires = "new_registrant")]
        new_auth_info: Option<String>,
    },
}

/// Poll actions.
#[derive(Debug, Subcommand)]
pub enum PollAction {
    /// Take and acknowledge one message
    Check,

    /// Take and acknowledge messages until the queue is empty
    Drain {
        /// Maximum number of messages to take
        #[arg(long, default_value_t = crate::poll::DrainOptions::DEFAULT_MAX_MESSAGES)]
        max: usize,

        /// Pause between messages, in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Overall time budget, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration, with literal passwords masked
    Dump,

    /// Validate configuration and resolve credentials
    Validate,

    /// Show configuration file path
    Path,
}
