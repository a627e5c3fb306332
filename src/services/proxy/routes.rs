//! Static prefix route table: which upstream owns which path subtree.

use url::Url;

use crate::config::Upstreams;
use crate::path_pattern::PathPattern;

#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub pattern: PathPattern,
    pub upstream: Url,
}

impl Route {
    pub fn new(id: impl Into<String>, pattern: &str, upstream: Url) -> Self {
        Self {
            id: id.into(),
            pattern: PathPattern::parse(pattern),
            upstream,
        }
    }

    /// Upstream URL for a request path + optional query, keeping the path as-is.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let base = self.upstream.as_str().trim_end_matches('/');
        match query {
            Some(query) => format!("{base}{path}?{query}"),
            None => format!("{base}{path}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn library(upstreams: &Upstreams) -> Self {
        Self::new(vec![
            Route::new("auth-service", "/api/auth/**", upstreams.auth.clone()),
            Route::new("catalog-service", "/api/catalog/**", upstreams.catalog.clone()),
            Route::new("reader-service", "/api/readers/**", upstreams.readers.clone()),
        ])
    }

    /// Most specific matching route.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|route| route.pattern.matches(path))
            .max_by_key(|route| route.pattern.specificity())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
