/*
 * Responsibility
 * - Shared, read-only context handed to middleware and handlers
 * - Clone is cheap (Arc / pooled client inside)
 */
use std::sync::Arc;

use identity::TokenCodec;

use crate::middleware::auth::AccessPolicy;
use crate::services::proxy::{RouteTable, UpstreamClient};

#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub policy: Arc<AccessPolicy>,
    pub routes: Arc<RouteTable>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(
        codec: TokenCodec,
        policy: AccessPolicy,
        routes: RouteTable,
        upstream: UpstreamClient,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            policy: Arc::new(policy),
            routes: Arc::new(routes),
            upstream,
        }
    }
}
