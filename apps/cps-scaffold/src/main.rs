//! # CPS Scaffold
//!
//! Terminal client for the metacognitive scaffolding agent.
//!
//! ## Usage
//!
//! ```bash
//! # Talk through an assignment
//! cps-scaffold --api-url http://localhost:8000 chat
//!
//! # One message, JSON answer
//! cps-scaffold --json-mode send "Plan a school garden"
//!
//! # Browse recorded sessions
//! cps-scaffold sessions --limit 20
//! cps-scaffold transitions 5f0c7d0e-...
//! ```

use clap::Parser;
use cps_scaffold::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing on stderr; CPS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CPS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "cps_scaffold=debug"
    } else {
        "cps_scaffold=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  CPS Scaffold v{}

  Understand the challenge • Generate ideas • Prepare for action
"#,
        env!("CARGO_PKG_VERSION")
    );
}
