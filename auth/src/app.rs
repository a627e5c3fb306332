use std::{panic, process, sync::Arc};

use axum::{Router, routing::get};
use identity::TokenCodec;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::error::AppError;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::{AccountService, TokenIssuer};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise info with sqlx query logs quieted.
    // RUST_LOG=info,auth=debug cargo run -p auth
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing; stderr may be hidden depending on how
        // the process is launched.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        // Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting auth service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, addr = %config.addr, "bind failed");
            AppError::Internal
        })?;
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!(error = %e, "server error");
        AppError::Internal
    })?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    // Process-level services are built here and injected into shared state.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "database connection failed");
            AppError::Internal
        })?;

    // Schema is embedded at compile time from auth/migrations.
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "migration failed");
        AppError::Internal
    })?;

    let codec = TokenCodec::new(config.jwt_secret.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "JWT_SECRET rejected");
        AppError::Internal
    })?;
    // Signs access tokens with the secret the gateway verifies against.
    let issuer = TokenIssuer::new(Arc::new(codec), config.access_token_ttl_seconds);

    let accounts = AccountService::new(
        Arc::new(UserRepo::new(pool)),
        issuer,
        config.bcrypt_cost,
    );

    Ok(AppState::new(Arc::new(accounts)))
}

// Paths keep the /api/auth prefix because the gateway forwards them verbatim.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", api::v1::routes())
        .with_state(state)
}
