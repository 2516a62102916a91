use std::{env, sync::Arc};

use clinic_auth::{AuthState, JwtService};
use clinic_db_postgres::{PgAccountStore, PgPatientStore, create_pool, ensure_schema};
use clinic_server::config::loader::load_config;
use clinic_server::{AppState, ServerBuilder};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From CLINIC_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (clinic.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (CLINIC_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    clinic_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    clinic_server::observability::apply_logging_level(&cfg.logging.level);

    let jwt = match JwtService::new(&cfg.auth) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Auth initialization failed: {e}");
            std::process::exit(2);
        }
    };

    let pool = match create_pool(&cfg.storage.postgres).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Database connection failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = ensure_schema(&pool).await {
        eprintln!("Schema bootstrap failed: {e}");
        std::process::exit(1);
    }

    let state = AppState {
        accounts: Arc::new(PgAccountStore::new(pool.clone())),
        patients: Arc::new(PgPatientStore::new(pool)),
        auth: AuthState::new(jwt),
    };

    let server = ServerBuilder::new(state).with_addr(cfg.addr()).build();
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: CLINIC_CONFIG
/// 3. Default: clinic.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    if let Ok(path) = env::var("CLINIC_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    ("clinic.toml".to_string(), ConfigSource::Default)
}
