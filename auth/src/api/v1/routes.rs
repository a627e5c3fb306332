use axum::{Router, routing::post};

use crate::api::v1::handlers::auth::{login, register};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
