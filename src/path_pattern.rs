/// Ant-style path pattern as used by the route table and the access policy.
///
/// `/api/catalog/**` matches `/api/catalog` and everything below it;
/// anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => Self::Subtree(prefix.trim_end_matches('/').to_string()),
            None => Self::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Subtree(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
                None => false,
            },
        }
    }

    /// Length of the literal part; longer patterns are more specific.
    pub fn specificity(&self) -> usize {
        match self {
            Self::Exact(exact) => exact.len(),
            Self::Subtree(prefix) => prefix.len(),
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(exact) => f.write_str(exact),
            Self::Subtree(prefix) => write!(f, "{prefix}/**"),
        }
    }
}
