//! Bound controller functions.
//!
//! Controller methods are plain async functions taking the shared controller
//! and the request. Two shapes exist: route handlers, whose output is
//! serialized into the response, and guard middleware, which hand the request
//! back to advance.

use std::future::Future;
use std::sync::Arc;

use axum::{body::Body, http::Request};
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::controller::descriptor::{Middleware, MiddlewareFuture};
use crate::http::error::ApiError;
use crate::http::request::ApiRequest;

/// Future returned by a route handler, already serialized.
pub type HandlerFuture = BoxFuture<'static, Result<Value, ApiError>>;

/// A controller route method.
pub trait Handler<C>: Send + Sync + 'static {
    fn call(&self, controller: Arc<C>, req: ApiRequest) -> HandlerFuture;

    /// Setup problems found when the handler was built, reported when the
    /// route is materialized.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<C, F, Fut, T> Handler<C> for F
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Serialize,
{
    fn call(&self, controller: Arc<C>, req: ApiRequest) -> HandlerFuture {
        let fut = (self)(controller, req);
        Box::pin(async move {
            let result = fut.await?;
            Ok(serde_json::to_value(result)?)
        })
    }
}

/// A controller method used as guard middleware (`authorize`).
pub trait MiddlewareHandler<C>: Send + Sync + 'static {
    fn call(&self, controller: Arc<C>, req: Request<Body>) -> MiddlewareFuture;
}

impl<C, F, Fut> MiddlewareHandler<C> for F
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request<Body>, ApiError>> + Send + 'static,
{
    fn call(&self, controller: Arc<C>, req: Request<Body>) -> MiddlewareFuture {
        Box::pin((self)(controller, req))
    }
}

/// A controller function recorded under a handler name.
pub enum BoundHandler<C> {
    Route(Arc<dyn Handler<C>>),
    Guard(Arc<dyn MiddlewareHandler<C>>),
}

impl<C> Clone for BoundHandler<C> {
    fn clone(&self) -> Self {
        match self {
            BoundHandler::Route(h) => BoundHandler::Route(Arc::clone(h)),
            BoundHandler::Guard(h) => BoundHandler::Guard(Arc::clone(h)),
        }
    }
}

/// Bind a guard method to a controller instance as a plain middleware stage.
pub fn bind_guard<C: Send + Sync + 'static>(
    name: &str,
    controller: Arc<C>,
    guard: Arc<dyn MiddlewareHandler<C>>,
) -> Middleware {
    Middleware::from_fn(name.to_string(), move |req| {
        guard.call(Arc::clone(&controller), req)
    })
}
