//! Coarse path/method access rules, evaluated after the relay.
//!
//! The relay never rejects; this layer does, by checking whether an
//! `Identity` was bound to the request when the matching rule requires one.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
};
use identity::Identity;

use crate::error::AppError;
use crate::path_pattern::PathPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permit,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    // empty = any method
    methods: Vec<Method>,
    pattern: PathPattern,
    access: Access,
}

impl AccessRule {
    pub fn any(pattern: &str, access: Access) -> Self {
        Self {
            methods: Vec::new(),
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn for_methods(methods: &[Method], pattern: &str, access: Access) -> Self {
        Self {
            methods: methods.to_vec(),
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        (self.methods.is_empty() || self.methods.contains(method)) && self.pattern.matches(path)
    }
}

/// Ordered rule list; first match wins, unmatched requests need a caller.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Access,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self {
            rules,
            fallback: Access::Authenticated,
        }
    }

    /// Rules for the e-library services.
    pub fn library_defaults() -> Self {
        use Access::*;

        Self::new(vec![
            AccessRule::for_methods(&[Method::GET], "/api/catalog/**", Permit),
            AccessRule::for_methods(
                &[Method::POST, Method::PUT, Method::DELETE],
                "/api/catalog/**",
                Authenticated,
            ),
            AccessRule::for_methods(
                &[Method::GET, Method::POST, Method::DELETE],
                "/api/readers/**",
                Authenticated,
            ),
            AccessRule::any("/api/auth/**", Permit),
            AccessRule::any("/health", Permit),
        ])
    }

    pub fn decide(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }
}

pub fn apply<S>(router: Router<S>, policy: Arc<AccessPolicy>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(policy, policy_middleware))
}

async fn policy_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = policy.decide(req.method(), req.uri().path());

    if access == Access::Authenticated && req.extensions().get::<Identity>().is_none() {
        tracing::info!(
            method = %req.method(),
            path = %req.uri().path(),
            "anonymous request to protected route"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}
