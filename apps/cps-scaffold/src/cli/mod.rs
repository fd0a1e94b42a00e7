//! # CPS Scaffold CLI Module
//!
//! ## Available Commands
//!
//! - `chat` - Interactive scaffolded conversation (default)
//! - `send` - Start a session with one message and print the answer
//! - `stages` - Print the stage catalog
//! - `health` - Check the backend
//! - `sessions` - List recorded sessions
//! - `conversations` - Show the transcript of a recorded session
//! - `transitions` - Show the stage changes of a recorded session

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use cps_core::CpsError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// CPS Scaffold - metacognitive scaffolding for Creative Problem Solving
///
/// Talk through an assignment with the scaffolding agent, stage by stage,
/// or browse recorded sessions.
#[derive(Parser, Debug)]
#[command(name = "cps-scaffold")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Backend base URL (overrides config file and CPS_API_URL)
    #[arg(short = 'u', long, global = true)]
    pub api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "CPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive conversation over stdin
    Chat,

    /// Start a session with one message and print the agent's answer
    Send {
        /// Assignment or first message
        text: String,
    },

    /// Print the CPS stage catalog
    Stages,

    /// Check that the backend is reachable
    Health,

    /// List recorded sessions
    Sessions {
        /// Only sessions of this user
        #[arg(long)]
        user_id: Option<String>,

        /// Number of sessions to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Maximum number of sessions (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the transcript of a recorded session
    Conversations {
        /// Session ID
        session_id: String,
    },

    /// Show the stage transitions of a recorded session
    Transitions {
        /// Session ID
        session_id: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: file and environment, then command-line flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, CpsError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
        config.validate()?;
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CpsError> {
    let json_mode = cli.json_mode;

    // The catalog needs no backend or config.
    if let Some(Commands::Stages) = cli.command {
        return cmd_stages(json_mode);
    }

    let config = resolve_config(&cli)?;
    tracing::debug!(api_url = %config.api_url, "configuration resolved");

    match cli.command {
        Some(Commands::Send { text }) => cmd_send(&config, json_mode, &text).await,
        Some(Commands::Health) => cmd_health(&config, json_mode).await,
        Some(Commands::Sessions {
            user_id,
            skip,
            limit,
        }) => cmd_sessions(&config, json_mode, user_id.as_deref(), skip, limit).await,
        Some(Commands::Conversations { session_id }) => {
            cmd_conversations(&config, json_mode, &session_id).await
        }
        Some(Commands::Transitions { session_id }) => {
            cmd_transitions(&config, json_mode, &session_id).await
        }
        Some(Commands::Stages) => cmd_stages(json_mode),
        Some(Commands::Chat) | None => cmd_chat(&config, json_mode).await,
    }
}
