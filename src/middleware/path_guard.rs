//! Refuse paths whose meaning changes under URL normalization.
//!
//! The access policy and the route table match the raw request path, while
//! the upstream URL is built with `url`, which resolves `.`/`..` segments
//! (including `%2e` spellings and `\` separators). A request like
//! `/api/auth/../catalog/x` would be judged as an auth path and delivered as a
//! catalog one, so such paths are rejected with 400 before anything else.

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;

pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(reject_dot_segments))
}

async fn reject_dot_segments(req: Request, next: Next) -> Result<Response, AppError> {
    if is_ambiguous(req.uri().path()) {
        tracing::warn!(path = %req.uri().path(), "rejected non-normalized path");
        return Err(AppError::InvalidPath);
    }

    Ok(next.run(req).await)
}

pub fn is_ambiguous(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    })
}
