//! GreenDan CLI - drive the client core from a terminal.
//!
//! Commands:
//! - `greendan login [email]`: log in and persist the session token
//! - `greendan logout`: forget the stored token
//! - `greendan status`: show whether a token is stored and the version check
//! - `greendan version`: run the version check only

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use greendan_core::api::ApiClient;
use greendan_core::auth::AuthSession;
use greendan_core::diagnostics::{Diagnostics, TracingDiagnostics};
use greendan_core::navigation::SecondaryAction;
use greendan_core::screen::LoginScreen;
use greendan_core::version::{AppStoreProvider, Platform, PlayStoreProvider, VersionGate, VersionProvider};
use greendan_core::{Config, LoginOutcome};

/// Installed version reported to the version check
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber for logging.
///
/// Uses RUST_LOG to control the level (default `warn`). When
/// `GREENDAN_LOG_DIR` is set, events are also written to a daily log file
/// there; the returned guard must be kept alive to flush it.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("GREENDAN_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "greendan.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn print_usage() {
    eprintln!("Usage: greendan <login [email] | logout | status | version>");
    for action in SecondaryAction::ALL {
        eprintln!("  {} -> {}", action.title(), action.route().name());
    }
}

struct Services {
    config: Config,
    screen: LoginScreen,
}

fn build_services() -> Result<Services> {
    let config = Config::load().context("Failed to load config")?;
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);

    let api = ApiClient::new(config.auth_base_url.clone()).context("Failed to build HTTP client")?;
    let provider: Arc<dyn VersionProvider> = match config.platform {
        Platform::Android => Arc::new(PlayStoreProvider::new(api.http().clone())),
        Platform::Ios => Arc::new(AppStoreProvider::new(api.http().clone(), config.country.clone())),
    };

    let store = Arc::new(config.token_store().context("Failed to open token store")?);
    let auth = Arc::new(AuthSession::new(Arc::new(api), store, diagnostics.clone()));
    let gate = Arc::new(VersionGate::new(APP_VERSION, config.store_id.clone(), provider, diagnostics));

    Ok(Services {
        screen: LoginScreen::new(auth, gate),
        config,
    })
}

fn prompt_email(default: Option<&str>) -> Result<String> {
    match default {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let email = line.trim().to_string();

    Ok(match (email.is_empty(), default) {
        (true, Some(last)) => last.to_string(),
        _ => email,
    })
}

async fn login(mut services: Services, email_arg: Option<String>) -> Result<()> {
    let report = services.screen.mount().await;
    if let Some(e) = report.storage_error {
        eprintln!("Warning: could not read the stored session: {}", e);
    }

    let email = match email_arg {
        Some(email) => email,
        None => prompt_email(services.config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    services.screen.set_email(email.clone());
    services.screen.set_password(password);

    let outcome = services
        .screen
        .submit()
        .await
        .context("Logged in, but the session token could not be saved")?;

    if let Some(message) = outcome.user_message() {
        println!("{}", message);
    }

    if let LoginOutcome::Authenticated { navigate } = &outcome {
        info!(route = navigate.name(), "Login complete");
        services.config.last_email = Some(email);
        if let Err(e) = services.config.save() {
            tracing::warn!(error = %e, "Failed to save config");
        }
        println!("Next screen: {}", navigate.name());
    }

    let version = services.screen.version();
    if version.update_available() {
        println!("A newer version ({}) is available.", version.latest_display());
    }
    Ok(())
}

async fn status(services: Services) -> Result<()> {
    let report = services.screen.mount().await;
    match report.storage_error {
        Some(e) => println!("Session: unreadable ({})", e),
        None if report.has_session => {
            match services.screen.auth().store().load_session() {
                Ok(Some(session)) => println!("Session: token stored {} min ago", session.age_minutes()),
                _ => println!("Session: token stored"),
            }
        }
        None => println!("Session: none"),
    }
    for line in services.screen.version_lines() {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };

    let services = build_services()?;
    match command {
        "login" => login(services, args.get(1).cloned()).await,
        "logout" => {
            services.screen.auth().logout().context("Failed to clear the stored session")?;
            println!("Logged out.");
            Ok(())
        }
        "status" => status(services).await,
        "version" => {
            services.screen.refresh_version().await;
            for line in services.screen.version_lines() {
                println!("{}", line);
            }
            Ok(())
        }
        _ => {
            print_usage();
            Err(anyhow::anyhow!("Unknown command: {}", command))
        }
    }
}
