//! Scope matching for guard middleware.
//!
//! # Responsibilities
//! - Decide whether a guard declared with `authorize` applies to a request
//! - `*` (or an empty path / `/`) matches every route of the controller
//! - Any other path matches itself and everything below it
//!
//! # Design Decisions
//! - Matching is on whole segments: `/admin` covers `/admin/x`, not `/administrator`
//! - Case-sensitive, like route paths
//! - Paths are controller-relative (the router strips the base path)

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Request paths a guard applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeMatcher {
    Any,
    Prefix(String),
}

impl ScopeMatcher {
    /// Build from an `authorize` path.
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        if path == "*" || trimmed.is_empty() {
            return ScopeMatcher::Any;
        }
        if trimmed.starts_with('/') {
            ScopeMatcher::Prefix(trimmed.to_string())
        } else {
            ScopeMatcher::Prefix(format!("/{}", trimmed))
        }
    }

    pub fn matches_path(&self, path: &str) -> bool {
        match self {
            ScopeMatcher::Any => true,
            ScopeMatcher::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

impl Matcher for ScopeMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_scope() {
        for path in ["*", "/", ""] {
            assert_eq!(ScopeMatcher::new(path), ScopeMatcher::Any);
        }
        assert!(ScopeMatcher::Any.matches_path("/anything/at/all"));
    }

    #[test]
    fn test_prefix_scope() {
        let matcher = ScopeMatcher::new("/admin/");

        let req1 = Request::builder()
            .uri("http://example.com/admin/users")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req1));

        let req2 = Request::builder()
            .uri("http://example.com/admin")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req2));

        let req3 = Request::builder()
            .uri("http://example.com/administrator")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req3));
    }

    #[test]
    fn test_relative_prefix_gets_slash() {
        assert_eq!(ScopeMatcher::new("reports"), ScopeMatcher::Prefix("/reports".into()));
    }
}
