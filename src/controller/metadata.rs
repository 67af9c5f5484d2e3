//! Per-controller route metadata.
//!
//! # Merge rules
//! - Verb binding on an existing handler name updates kind, path and status
//!   and keeps the middleware already attached
//! - Middleware attachment appends, creating a placeholder descriptor when the
//!   handler has no binding yet
//! - One descriptor per handler name, in first-declaration order

use axum::http::StatusCode;

use crate::controller::descriptor::{HandlerKind, Middleware, RouteDescriptor};

/// Mount point used when a controller declares none.
pub const DEFAULT_BASE_PATH: &str = "/";

/// Path used by `authorize` when none is given: every route.
pub const ANY_PATH: &str = "*";

/// Base path and ordered route descriptors of one controller type.
#[derive(Debug, Clone)]
pub struct ControllerMetadata {
    base_path: String,
    routes: Vec<RouteDescriptor>,
}

impl Default for ControllerMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerMetadata {
    pub fn new() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            routes: Vec::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn set_base_path(&mut self, path: impl Into<String>) {
        self.base_path = path.into();
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn descriptor(&self, handler_name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|d| d.handler_name == handler_name)
    }

    fn entry(&mut self, handler_name: &str) -> &mut RouteDescriptor {
        let idx = match self.routes.iter().position(|d| d.handler_name == handler_name) {
            Some(idx) => idx,
            None => {
                self.routes.push(RouteDescriptor::placeholder(handler_name));
                self.routes.len() - 1
            }
        };
        &mut self.routes[idx]
    }

    /// Bind a handler name to a verb (or `Use`) and path.
    pub fn bind(
        &mut self,
        handler_name: &str,
        kind: HandlerKind,
        path: impl Into<String>,
        status: Option<StatusCode>,
    ) -> &mut RouteDescriptor {
        let descriptor = self.entry(handler_name);
        descriptor.kind = Some(kind);
        descriptor.path = Some(path.into());
        descriptor.status = status;
        descriptor
    }

    /// Append middleware to a handler's chain.
    pub fn attach<I>(&mut self, handler_name: &str, middlewares: I) -> &mut RouteDescriptor
    where
        I: IntoIterator<Item = Middleware>,
    {
        let descriptor = self.entry(handler_name);
        descriptor.middlewares.extend(middlewares);
        descriptor
    }

    pub fn set_status(&mut self, handler_name: &str, status: StatusCode) {
        self.entry(handler_name).status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: impl Into<std::sync::Arc<str>>) -> Middleware {
        Middleware::from_fn(name, |req| async move { Ok(req) })
    }

    #[test]
    fn test_default_base_path() {
        let meta = ControllerMetadata::new();
        assert_eq!(meta.base_path(), "/");
        assert!(meta.routes().is_empty());
    }

    #[test]
    fn test_verb_then_middleware_merges() {
        let mut meta = ControllerMetadata::new();
        meta.bind("list", HandlerKind::Get, "/", None);
        meta.attach("list", [noop("auth")]);
        meta.attach("list", [noop("audit")]);

        assert_eq!(meta.routes().len(), 1);
        let d = meta.descriptor("list").unwrap();
        assert_eq!(d.kind, Some(HandlerKind::Get));
        assert_eq!(d.middleware_names(), vec!["auth", "audit"]);
    }

    #[test]
    fn test_middleware_before_verb_creates_placeholder() {
        let mut meta = ControllerMetadata::new();
        meta.attach("create", [noop("auth")]);

        let d = meta.descriptor("create").unwrap();
        assert!(d.is_placeholder());
        assert_eq!(d.path, None);

        meta.bind("create", HandlerKind::Post, "/", Some(StatusCode::CREATED));
        assert_eq!(meta.routes().len(), 1);

        let d = meta.descriptor("create").unwrap();
        assert_eq!(d.kind, Some(HandlerKind::Post));
        assert_eq!(d.status, Some(StatusCode::CREATED));
        assert_eq!(d.middleware_names(), vec!["auth"]);
    }

    #[test]
    fn test_rebinding_updates_verb_and_keeps_middleware() {
        let mut meta = ControllerMetadata::new();
        meta.bind("item", HandlerKind::Get, "/a", Some(StatusCode::ACCEPTED));
        meta.attach("item", [noop("m1")]);
        meta.bind("item", HandlerKind::Put, "/b", None);

        let d = meta.descriptor("item").unwrap();
        assert_eq!(d.kind, Some(HandlerKind::Put));
        assert_eq!(d.path.as_deref(), Some("/b"));
        assert_eq!(d.status, None);
        assert_eq!(d.middleware_names(), vec!["m1"]);
    }

    #[test]
    fn test_many_declarations_single_descriptor() {
        let mut meta = ControllerMetadata::new();
        let mut expected = Vec::new();
        for i in 0..10 {
            if i % 3 == 0 {
                meta.bind("h", HandlerKind::Get, format!("/{}", i), None);
            } else {
                let name = format!("m{}", i);
                meta.attach("h", [noop(name.clone())]);
                expected.push(name);
            }
        }
        meta.bind("other", HandlerKind::Delete, "/x", None);

        assert_eq!(meta.routes().len(), 2);
        assert_eq!(meta.descriptor("h").unwrap().middleware_names(), expected);
    }

    #[test]
    fn test_declaration_order_preserved_across_handlers() {
        let mut meta = ControllerMetadata::new();
        meta.bind("b", HandlerKind::Get, "/b", None);
        meta.attach("a", [noop("m")]);
        meta.bind("c", HandlerKind::Post, "/c", None);
        meta.bind("a", HandlerKind::Get, "/a", None);

        let names: Vec<_> = meta.routes().iter().map(|d| d.handler_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
