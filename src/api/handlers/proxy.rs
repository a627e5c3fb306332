/*
 * Responsibility
 * - Fallback handler: every non-local path is resolved against the route table
 *   and forwarded with whatever identity the relay attached
 */
use axum::{
    extract::{Request, State},
    response::Response,
};

use crate::error::AppError;
use crate::services::proxy::ProxyError;
use crate::state::AppState;

pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    let route = state
        .routes
        .resolve(&path)
        .ok_or_else(|| AppError::NoRoute { path: path.clone() })?;

    state.upstream.forward(route, req).await.map_err(|err| {
        if let ProxyError::BodyTooLarge { limit } = err {
            tracing::info!(route = %route.id, path = %path, limit, "request body over limit");
            return AppError::PayloadTooLarge;
        }

        tracing::error!(
            error = %err,
            route = %route.id,
            upstream = %route.upstream,
            path = %path,
            "failed to forward request"
        );
        AppError::BadGateway {
            route: route.id.clone(),
        }
    })
}
