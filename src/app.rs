/*
 * Responsibility
 * - Config → shared state → Router assembly
 * - Middleware order (outermost first):
 *   http (request id / trace / limits) → path_guard → strip_identity → relay
 *   → policy → routes
 * - axum::serve() startup; configuration errors abort before binding
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use identity::TokenCodec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::handlers::{health::health, proxy::forward};
use crate::config::Config;
use crate::middleware::{
    self,
    auth::{AccessPolicy, policy, relay, strip_identity},
};
use crate::services::proxy::{RouteTable, UpstreamClient};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

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

        // development: crash loudly; production: keep serving other requests
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env().context("loading gateway configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    for route in state.routes.routes() {
        tracing::info!(route = %route.id, pattern = %route.pattern, upstream = %route.upstream, "route");
    }

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let codec = TokenCodec::new(config.jwt_secret.as_bytes())
        .context("JWT_SECRET rejected")?
        .with_leeway(config.jwt_leeway_seconds);

    let upstream = UpstreamClient::new(config.upstream_timeout, config.body_limit_bytes)
        .context("building upstream HTTP client")?;

    Ok(AppState::new(
        codec,
        AccessPolicy::library_defaults(),
        RouteTable::library(&config.upstreams),
        upstream,
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .fallback(forward)
        .with_state(state.clone());

    let router = policy::apply(router, state.policy.clone());
    let router = relay::apply(router, state.codec.clone());
    let router = strip_identity::apply(router);
    let router = middleware::path_guard::apply(router);

    middleware::http::apply(router, config)
}
