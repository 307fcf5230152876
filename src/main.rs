//! Command-line entry point.
//!
//! Startup is explicit and ordered: parse arguments, install logging,
//! dispatch. Setup failures log and exit nonzero; a failed launch does not:
//! the session's `start()` keeps the never-crash contract for unattended
//! runs, whose only failure signal is the log stream.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chromium_session::config::DEFAULT_CONFIG_FILE;
use chromium_session::{ChromiumEngine, Result, Session, Settings};

// ============================================================================
// CLI
// ============================================================================

/// Persistent, stateful Chromium browsing sessions.
#[derive(Debug, Parser)]
#[command(name = "chromium-session", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "CHROMIUM_SESSION_CONFIG")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Launch and supervise a browsing session (the default).
    Run {
        /// Run headless regardless of the configuration.
        #[arg(long)]
        headless: bool,

        /// Profile name override.
        #[arg(long)]
        profile: Option<String>,
    },

    /// Emit a value-blanked copy of the configuration file.
    SampleConfig {
        /// Destination path; defaults to a `sample-` prefixed sibling.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "chromium_session=debug"
    } else {
        "chromium_session=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Dispatch
// ============================================================================

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::SampleConfig { out }) => {
            let dst = Settings::write_sample(&cli.config, out.as_deref())?;
            info!(path = %dst.display(), "Sample configuration written");
            Ok(())
        }
        Some(Commands::Run { headless, profile }) => {
            run_session(&cli.config, headless, profile).await
        }
        None => run_session(&cli.config, false, None).await,
    }
}

/// Loads settings, builds the engine and session, and runs it.
async fn run_session(
    config_path: &Path,
    force_headless: bool,
    profile: Option<String>,
) -> Result<()> {
    let settings = Settings::load(config_path)?;

    let engine = match &settings.browser.binary {
        Some(path) => ChromiumEngine::new(path)?,
        None => ChromiumEngine::discover()?,
    };

    let mut builder = Session::builder(engine)
        .headless_if(force_headless || settings.browser.headless)
        .page_load_timeout(settings.browser.page_load_timeout());

    if let Some(name) = profile.or_else(|| settings.browser.profile.clone()) {
        builder = builder.profile(name);
    }

    let mut session = builder.build()?;

    // Launch failures have already been logged inside start(); the run
    // carries on to an orderly exit either way.
    session.start().await;

    if let Err(e) = session.close().await {
        error!(error = %e, "Error while closing the browser");
    }

    info!("Session finished");
    Ok(())
}
