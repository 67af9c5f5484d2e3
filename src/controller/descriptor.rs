//! Route descriptors and middleware handles.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::MethodFilter,
};
use futures_util::future::BoxFuture;

use crate::http::error::ApiError;

/// Future returned by a middleware stage.
pub type MiddlewareFuture = BoxFuture<'static, Result<Request<Body>, ApiError>>;

/// Kind of binding a descriptor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Get,
    Post,
    Put,
    Delete,
    Options,
    /// Guard middleware applied to the controller's routes.
    Use,
}

impl HandlerKind {
    /// Router method filter for verb kinds; `None` for `Use`.
    pub fn method_filter(self) -> Option<MethodFilter> {
        match self {
            HandlerKind::Get => Some(MethodFilter::GET),
            HandlerKind::Post => Some(MethodFilter::POST),
            HandlerKind::Put => Some(MethodFilter::PUT),
            HandlerKind::Delete => Some(MethodFilter::DELETE),
            HandlerKind::Options => Some(MethodFilter::OPTIONS),
            HandlerKind::Use => None,
        }
    }

    pub fn method(self) -> Option<Method> {
        match self {
            HandlerKind::Get => Some(Method::GET),
            HandlerKind::Post => Some(Method::POST),
            HandlerKind::Put => Some(Method::PUT),
            HandlerKind::Delete => Some(Method::DELETE),
            HandlerKind::Options => Some(Method::OPTIONS),
            HandlerKind::Use => None,
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method() {
            Some(method) => write!(f, "{}", method),
            None => write!(f, "USE"),
        }
    }
}

/// A named middleware stage.
///
/// The function receives the request and either hands it back to advance to
/// the next stage or fails, which short-circuits the chain.
#[derive(Clone)]
pub struct Middleware {
    name: Arc<str>,
    run: Arc<dyn Fn(Request<Body>) -> MiddlewareFuture + Send + Sync>,
}

impl Middleware {
    pub fn from_fn<F, Fut>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request<Body>, ApiError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(move |req: Request<Body>| -> MiddlewareFuture { Box::pin(f(req)) }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, req: Request<Body>) -> MiddlewareFuture {
        (self.run)(req)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

/// One controller method's binding.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// `None` until a verb or `authorize` is declared for the handler.
    pub kind: Option<HandlerKind>,
    pub path: Option<String>,
    pub handler_name: String,
    /// Success status override; 200 when absent.
    pub status: Option<StatusCode>,
    /// Stored and executed in declaration order.
    pub middlewares: Vec<Middleware>,
}

impl RouteDescriptor {
    /// Descriptor carrying only a handler name.
    pub fn placeholder(handler_name: impl Into<String>) -> Self {
        Self {
            kind: None,
            path: None,
            handler_name: handler_name.into(),
            status: None,
            middlewares: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_none()
    }

    pub fn middleware_names(&self) -> Vec<&str> {
        self.middlewares.iter().map(Middleware::name).collect()
    }
}
