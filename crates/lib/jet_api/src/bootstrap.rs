//! Ordered process startup: configuration, logging, store, migrations,
//! services, seed data, router, listener.
//!
//! Each stage fails with its own [`BootstrapError`] variant so the binary can
//! report which step stopped the process.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use jet_core::auth::jwt::{SigningSecret, TokenService};
use jet_core::clock::Clock;
use jet_core::repo::{PgUserRepository, UserRepository};
use jet_core::seed::{SeedError, SeedOutcome, seed_baseline};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError};
use crate::logging::{self, LoggingError};
use crate::middleware::auth::AllowList;
use crate::services::auth::AuthService;
use crate::services::users::UserService;
use crate::{AppState, router};

/// Startup failures, one per stage.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("database connection: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("initial data: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Open the connection pool described by `config.database`.
pub async fn connect_store(config: &AppConfig) -> Result<PgPool, BootstrapError> {
    let options = config.database.connect_options()?;
    let pool = config
        .database
        .pool_options()
        .connect_with(options)
        .await
        .map_err(BootstrapError::Connect)?;
    info!(
        host = %config.database.host,
        dbname = %config.database.dbname,
        "database connected"
    );
    Ok(pool)
}

/// Build services over `store`, seed baseline users when enabled and return
/// the fully layered router.
///
/// `clock` replaces the wall clock used for token timestamps.
pub async fn build_app(
    config: AppConfig,
    store: Arc<dyn UserRepository>,
    clock: Option<Arc<dyn Clock>>,
) -> Result<Router, BootstrapError> {
    let mut tokens = TokenService::new(
        SigningSecret::new(config.jwt.secret.clone()),
        config.token_ttl(),
    );
    if let Some(clock) = clock {
        tokens = tokens.with_clock(clock);
    }
    let tokens = Arc::new(tokens);

    let users = UserService::new(store.clone(), config.seed.users.clone());
    let auth = AuthService::new(store.clone(), tokens.clone());

    if config.seed.enabled {
        match seed_baseline(store.as_ref(), &config.seed.users).await? {
            SeedOutcome::Skipped { existing } => info!(existing, "initial data skipped"),
            SeedOutcome::Inserted { count } => info!(count, "initial data inserted"),
        }
    } else {
        warn!("seeding disabled, store left as is");
    }

    let state = AppState {
        config: Arc::new(config),
        tokens,
        allow_list: Arc::new(AllowList::defaults()),
        users,
        auth,
        store,
    };
    Ok(router(state))
}

/// Bind `0.0.0.0:port` and serve until Ctrl-C or SIGTERM.
pub async fn serve(app: Router, port: u16) -> Result<(), BootstrapError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| BootstrapError::Bind { addr, source })?;
    info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(BootstrapError::Serve)?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

/// The full startup sequence against PostgreSQL.
pub async fn run(config_path: Option<&Path>) -> Result<(), BootstrapError> {
    let config = AppConfig::load(config_path)?;
    let _guard = logging::init(&config.logging, &config.app)?;
    info!(
        name = %config.app.name,
        version = %config.app.version,
        mode = %config.app.mode,
        "starting"
    );

    let pool = connect_store(&config).await?;
    info!("running database migrations");
    jet_core::migrate::migrate(&pool).await?;

    let port = config.app.port;
    let store: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool));
    let app = build_app(config, store, None).await?;

    serve(app, port).await
}
