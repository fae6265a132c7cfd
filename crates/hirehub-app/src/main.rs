mod auth;
mod cli;
mod console;
mod dashboard;

use std::process::ExitCode;
use std::sync::Arc;

use hirehub_common::{HireHubError, Role};
use hirehub_config::HireHubConfig;
use hirehub_platform::{FileSessionStore, Session};
use tracing_subscriber::EnvFilter;

use crate::auth::{AuthClient, Registration};
use crate::cli::{Args, Command};
use crate::console::{ConsoleNavigator, ConsoleToaster};

/// `--log-level` wins, then `RUST_LOG`, then the config file.
fn init_logging(level_override: Option<&str>, config: &HireHubConfig) {
    let filter = match level_override {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.directive())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> (HireHubConfig, Option<String>) {
    let loaded = match &args.config {
        Some(path) => hirehub_config::load_config_from(path),
        None => hirehub_config::load_config(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (HireHubConfig::default(), Some(e.to_string())),
    }
}

fn main() -> ExitCode {
    let args = cli::parse();

    // Config first so its log level applies; report load problems once
    // logging is up.
    let (config, config_error) = load_config(&args);
    init_logging(args.log_level.as_deref(), &config);

    tracing::info!("HireHub v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    if let Err(e) = hirehub_platform::ensure_dirs() {
        tracing::warn!("Failed to create directories: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(execute(args.command, config));
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_signed_in(verb: &str, session: &Session) {
    println!("{verb} as {} (user {})", session.role, session.user_id);
    if session.role != Role::Worker {
        println!(
            "Worker tools are unavailable for this role; use {}",
            session.role.dashboard_path()
        );
    }
}

async fn execute(command: Command, config: HireHubConfig) -> Result<(), HireHubError> {
    let store = FileSessionStore::open_default()?;
    match command {
        Command::Login {
            email,
            password,
            role,
        } => {
            let client = AuthClient::new(config.api.auth_url(), config.api.request_timeout())?;
            let session = client.login(&email, &password, role).await?;
            store.save(&session)?;
            print_signed_in("Logged in", &session);
            Ok(())
        }
        Command::Register {
            username,
            email,
            phone,
            password,
            role,
        } => {
            let client = AuthClient::new(config.api.auth_url(), config.api.request_timeout())?;
            let registration = Registration {
                username,
                email,
                phone,
                password,
                role,
            };
            let session = client.register(&registration).await?;
            store.save(&session)?;
            print_signed_in("Registered", &session);
            Ok(())
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            match store.load()? {
                Some(session) => {
                    println!("Logged in as {} (user {})", session.role, session.user_id)
                }
                None => println!("Not logged in"),
            }
            println!("Backend: {}", config.api.base_url);
            println!("Location provider: {:?}", config.location.provider);
            println!(
                "Notifications: {} (topic {})",
                config.api.ws_url(&config.notifications.ws_path),
                config.notifications.topic
            );
            Ok(())
        }
        Command::Run { available } => {
            if let Err(e) = auth::require_worker(&store) {
                if let Some(path) = e.redirect_path() {
                    println!("{e} ({path})");
                }
                return Err(e.into());
            }
            let store = Arc::new(store);
            let toaster = Arc::new(ConsoleToaster::default());
            let navigator = Arc::new(ConsoleNavigator::new(config.api.web_url.clone()));
            let pipeline =
                dashboard::build_pipeline(&config, store, toaster.clone(), navigator)?;
            dashboard::run(&pipeline, &toaster, available).await
        }
    }
}
