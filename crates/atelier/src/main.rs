//! atelier: gallery and print shop server
//!
//! Usage:
//!   atelier            - Start the web server
//!   atelier --help     - Show help
//!   atelier --version  - Show version

use std::sync::Arc;

use atelier_core::{Config, Database, LogNotifier, Notifier, SessionStore};
use atelier_web::AppState;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Serve the site
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("atelier {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting atelier...");
    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("atelier - artist gallery and print shop");
    println!();
    println!("Usage:");
    println!("  atelier            Start the web server");
    println!("  atelier --help     Show this help message");
    println!("  atelier --version  Show version");
    println!();
    println!("Settings are read from atelier.toml when present, then from the environment:");
    println!("  HOST / PORT                  Bind address (default: 0.0.0.0:8080)");
    println!("  STATIC_DIR                   Static files directory (default: ./static)");
    println!("  DB_PATH                      SQLite database file (default: ./database.db)");
    println!("  ADMIN_USERNAME               Admin login name (default: admin)");
    println!("  ADMIN_PASSWORD               Admin login password (default: password)");
    println!("  API_TOKEN                    Bearer token for the database download API");
    println!("  SESSION_TTL_HOURS            Admin session lifetime (default: 24)");
    println!("  SESSION_SWEEP_SECS           Expired session sweep interval (default: 3600)");
    println!("  EMAIL_SENDER_ADDRESS         Order notification sender");
    println!("  EMAIL_RECIPIENT_ADDRESS      Order notification recipient");
    println!("  GOOGLE_APP_PASSWORD          SMTP password");
    println!("  SMTP_HOST / SMTP_PORT        SMTP relay (default: smtp.gmail.com:587)");
}

/// Order notifier for this build and configuration
fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    #[cfg(feature = "smtp")]
    {
        if config.email.is_complete() {
            tracing::info!("Order notifications via SMTP ({})", config.email.smtp_host);
            return Arc::new(atelier_core::notify::SmtpNotifier::new(config.email.clone()));
        }
        tracing::warn!("Email settings incomplete, order notifications are only logged");
    }

    #[cfg(not(feature = "smtp"))]
    {
        if config.email.is_complete() {
            tracing::warn!("Email settings found but atelier was built without the smtp feature");
        }
    }

    Arc::new(LogNotifier)
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

    let sessions = Arc::new(SessionStore::with_ttl(config.session.ttl()));
    let sweeper = sessions.spawn_sweeper(config.session.sweep_interval());

    let notifier = build_notifier(&config);
    let state = AppState::new(config, db, sessions, notifier);

    tracing::info!("Press Ctrl+C to exit");
    let result = atelier_web::start_server(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutting down...");
    })
    .await;

    sweeper.abort();
    tracing::info!("Shutdown complete");
    result
}
