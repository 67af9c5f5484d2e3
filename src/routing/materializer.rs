//! Route materialization.
//!
//! # Responsibilities
//! - Turn a controller's route table into an axum `Router`
//! - Wrap route handlers with body parsing, response sending and error translation
//! - Wrap middleware so each stage runs, then explicitly advances
//! - Scope `authorize` guards to the controller's routes
//!
//! # Design Decisions
//! - Declared middleware order is execution order. axum runs the last-applied
//!   layer first, so layers are applied in reverse
//! - Guard chains (attached middleware, then the guard method) run before any
//!   route-level middleware
//! - Panics inside handlers or middleware are caught and reported as 500s
//! - Configuration errors are returned, never panicked on. Paths that differ
//!   only in parameter names are a conflict, since axum cannot hold both

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{on, MethodRouter},
    Router,
};
use futures_util::FutureExt;
use thiserror::Error;

use crate::controller::descriptor::{HandlerKind, Middleware};
use crate::controller::handler::{bind_guard, BoundHandler, Handler};
use crate::controller::table::{Controller, RouteTable};
use crate::http::error::ApiError;
use crate::http::request::ApiRequest;
use crate::http::response::{send, send_error};
use crate::observability::metrics;
use crate::routing::matcher::{Matcher, ScopeMatcher};
use crate::routing::path::{join, normalize_base_path, normalize_route_path, route_shape};

/// Errors detected while turning route tables into routers.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("{controller}: handler `{handler}` has middleware but no route binding")]
    Unbound {
        controller: &'static str,
        handler: String,
    },

    #[error("{controller}: handler `{handler}` has no bound function")]
    MissingHandler {
        controller: &'static str,
        handler: String,
    },

    #[error("{controller}: handler `{handler}` is declared as {kind} but bound to the wrong function shape")]
    KindMismatch {
        controller: &'static str,
        handler: String,
        kind: HandlerKind,
    },

    #[error("duplicate route {kind} {path} (handler `{handler}` in {controller})")]
    DuplicateRoute {
        controller: &'static str,
        handler: String,
        kind: HandlerKind,
        path: String,
    },

    #[error("route {path} (handler `{handler}` in {controller}) conflicts with {existing}")]
    ConflictingRoute {
        controller: &'static str,
        handler: String,
        path: String,
        existing: String,
    },

    #[error("{controller}: handler `{handler}` is misconfigured: {message}")]
    InvalidHandler {
        controller: &'static str,
        handler: String,
        message: String,
    },
}

/// Settings applied to every materialized route.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Maximum request body size read for a handler.
    pub body_limit: usize,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            body_limit: 2 * 1024 * 1024,
        }
    }
}

/// A route registered by a materialized controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub kind: HandlerKind,
    /// Controller-relative path, normalized.
    pub path: String,
}

/// Full paths registered so far, checked for duplicates and shape conflicts.
#[derive(Debug, Default)]
pub struct RouteSet {
    /// Shape to the first concrete path registered with it.
    shapes: HashMap<String, String>,
    methods: HashSet<(HandlerKind, String)>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `kind path`, where `path` is the full normalized path.
    pub fn insert(
        &mut self,
        controller: &'static str,
        handler: &str,
        kind: HandlerKind,
        path: &str,
    ) -> Result<(), MaterializeError> {
        let shape = route_shape(path);
        match self.shapes.get(&shape) {
            Some(existing) if existing != path => {
                return Err(MaterializeError::ConflictingRoute {
                    controller,
                    handler: handler.to_string(),
                    path: path.to_string(),
                    existing: existing.clone(),
                });
            }
            Some(_) => {}
            None => {
                self.shapes.insert(shape.clone(), path.to_string());
            }
        }

        if !self.methods.insert((kind, shape)) {
            return Err(MaterializeError::DuplicateRoute {
                controller,
                handler: handler.to_string(),
                kind,
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Output of materializing one controller.
pub struct MaterializedController {
    pub controller: &'static str,
    /// Normalized mount point; `None` for the root.
    pub base_path: Option<String>,
    pub router: Router,
    pub routes: Vec<(RouteKey, String)>,
}

/// Per-route data captured by the endpoint closure.
struct RouteContext {
    controller: &'static str,
    handler: String,
    status: StatusCode,
    body_limit: usize,
}

/// Build the router for one controller instance from its route table.
pub fn materialize<C: Controller>(
    controller: Arc<C>,
    table: &RouteTable<C>,
    options: &MaterializeOptions,
) -> Result<MaterializedController, MaterializeError> {
    let controller_name = std::any::type_name::<C>();
    let metadata = table.metadata();
    let base_path = normalize_base_path(metadata.base_path());

    let mut router = Router::new();
    let mut seen = RouteSet::new();
    let mut routes = Vec::new();
    let mut guards: Vec<(ScopeMatcher, Middleware)> = Vec::new();

    for descriptor in metadata.routes() {
        let handler_name = descriptor.handler_name.clone();
        let kind = descriptor.kind.ok_or_else(|| MaterializeError::Unbound {
            controller: controller_name,
            handler: handler_name.clone(),
        })?;
        let bound = table
            .handler(&handler_name)
            .ok_or_else(|| MaterializeError::MissingHandler {
                controller: controller_name,
                handler: handler_name.clone(),
            })?;

        match (kind.method_filter(), bound) {
            (None, BoundHandler::Guard(guard)) => {
                let scope = ScopeMatcher::new(descriptor.path.as_deref().unwrap_or("*"));
                for mw in &descriptor.middlewares {
                    guards.push((scope.clone(), mw.clone()));
                }
                guards.push((
                    scope,
                    bind_guard(&handler_name, Arc::clone(&controller), Arc::clone(guard)),
                ));
            }
            (Some(filter), BoundHandler::Route(handler)) => {
                let path = normalize_route_path(descriptor.path.as_deref().unwrap_or("/"));
                let key = RouteKey {
                    kind,
                    path: path.clone(),
                };
                seen.insert(controller_name, &handler_name, kind, &join(base_path.as_deref(), &path))?;
                handler.check().map_err(|message| MaterializeError::InvalidHandler {
                    controller: controller_name,
                    handler: handler_name.clone(),
                    message,
                })?;

                let ctx = Arc::new(RouteContext {
                    controller: controller_name,
                    handler: handler_name.clone(),
                    status: descriptor.status.unwrap_or(StatusCode::OK),
                    body_limit: options.body_limit,
                });
                let endpoint = endpoint(Arc::clone(&controller), Arc::clone(handler), ctx);
                let method_router = apply_middlewares(on(filter, endpoint), &descriptor.middlewares);
                router = router.route(&path, method_router);

                tracing::debug!(
                    controller = controller_name,
                    handler = %handler_name,
                    method = %kind,
                    path = %join(base_path.as_deref(), &path),
                    middlewares = descriptor.middlewares.len(),
                    "Route registered"
                );
                routes.push((key, handler_name));
            }
            _ => {
                return Err(MaterializeError::KindMismatch {
                    controller: controller_name,
                    handler: handler_name,
                    kind,
                })
            }
        }
    }

    if !guards.is_empty() {
        if routes.is_empty() {
            tracing::warn!(
                controller = controller_name,
                guards = guards.len(),
                "Guards declared on a controller without routes; ignoring"
            );
        } else {
            router = apply_guards(router, guards);
        }
    }

    Ok(MaterializedController {
        controller: controller_name,
        base_path,
        router,
        routes,
    })
}

fn endpoint<C: Send + Sync + 'static>(
    controller: Arc<C>,
    handler: Arc<dyn Handler<C>>,
    ctx: Arc<RouteContext>,
) -> impl Fn(Request) -> futures_util::future::BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |req: Request| {
        let controller = Arc::clone(&controller);
        let handler = Arc::clone(&handler);
        let ctx = Arc::clone(&ctx);
        Box::pin(async move { dispatch(controller, handler, &ctx, req).await })
    }
}

async fn dispatch<C: Send + Sync + 'static>(
    controller: Arc<C>,
    handler: Arc<dyn Handler<C>>,
    ctx: &RouteContext,
    req: Request,
) -> Response {
    let start = Instant::now();

    let response = match ApiRequest::from_http(req, ctx.body_limit).await {
        Ok(api_req) => match AssertUnwindSafe(handler.call(controller, api_req))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => send(ctx.status, result),
            Ok(Err(err)) => send_error(err),
            Err(panic) => {
                tracing::error!(
                    controller = ctx.controller,
                    handler = %ctx.handler,
                    panic = %panic_message(&panic),
                    "Handler panicked"
                );
                send_error(ApiError::internal("handler panicked"))
            }
        },
        Err(err) => send_error(err),
    };

    metrics::record_request(ctx.controller, &ctx.handler, response.status().as_u16(), start);
    response
}

/// Run one middleware stage and advance to `next` if it hands the request back.
async fn advance(mw: &Middleware, req: Request, next: Next) -> Response {
    match AssertUnwindSafe(mw.call(req)).catch_unwind().await {
        Ok(Ok(req)) => next.run(req).await,
        Ok(Err(err)) => {
            tracing::debug!(middleware = mw.name(), error = %err, "Middleware stopped the request");
            send_error(err)
        }
        Err(panic) => {
            tracing::error!(middleware = mw.name(), panic = %panic_message(&panic), "Middleware panicked");
            send_error(ApiError::internal("middleware panicked"))
        }
    }
}

/// Route middleware only wraps the bound method; other methods still get 405.
fn apply_middlewares(mut route: MethodRouter, middlewares: &[Middleware]) -> MethodRouter {
    for mw in middlewares.iter().rev() {
        let mw = mw.clone();
        route = route.route_layer(middleware::from_fn(move |req: Request, next: Next| {
            let mw = mw.clone();
            async move { advance(&mw, req, next).await }
        }));
    }
    route
}

fn apply_guards(mut router: Router, guards: Vec<(ScopeMatcher, Middleware)>) -> Router {
    for (scope, mw) in guards.into_iter().rev() {
        router = router.route_layer(middleware::from_fn(move |req: Request, next: Next| {
            let mw = mw.clone();
            let applies = scope.matches(&req);
            async move {
                if applies {
                    advance(&mw, req, next).await
                } else {
                    next.run(req).await
                }
            }
        }));
    }
    router
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
