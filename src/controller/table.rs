//! Route declaration API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::controller::descriptor::{HandlerKind, Middleware};
use crate::controller::handler::{BoundHandler, Handler, MiddlewareHandler};
use crate::controller::metadata::{ControllerMetadata, ANY_PATH};

/// A type whose methods are exposed as HTTP routes.
///
/// `configure` runs once per controller type; every instance of the type
/// shares the resulting table.
///
/// ```ignore
/// struct UsersController;
///
/// impl Controller for UsersController {
///     fn configure(routes: &mut RouteTable<Self>) {
///         routes.base_path("/users");
///         routes.get("list", "/", Self::list);
///         routes
///             .post("create", "/", validation::body::<NewUser, Self, _>(Self::create))
///             .status(StatusCode::CREATED)
///             .middleware(require_token());
///     }
/// }
/// ```
pub trait Controller: Send + Sync + Sized + 'static {
    fn configure(routes: &mut RouteTable<Self>);
}

/// Route metadata plus the functions bound to each handler name.
pub struct RouteTable<C> {
    metadata: ControllerMetadata,
    handlers: HashMap<String, BoundHandler<C>>,
}

impl<C> Default for RouteTable<C> {
    fn default() -> Self {
        Self {
            metadata: ControllerMetadata::new(),
            handlers: HashMap::new(),
        }
    }
}

impl<C: Send + Sync + 'static> RouteTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> &ControllerMetadata {
        &self.metadata
    }

    pub fn handler(&self, name: &str) -> Option<&BoundHandler<C>> {
        self.handlers.get(name)
    }

    /// Mount point of the controller.
    pub fn base_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.metadata.set_base_path(path);
        self
    }

    /// Bind `name` to `kind` at `path`, replacing any previous binding.
    pub fn route<H>(&mut self, kind: HandlerKind, name: &str, path: &str, handler: H) -> RouteEntry<'_, C>
    where
        H: Handler<C>,
    {
        self.metadata.bind(name, kind, path, None);
        self.handlers
            .insert(name.to_string(), BoundHandler::Route(Arc::new(handler)));
        RouteEntry {
            table: self,
            name: name.to_string(),
        }
    }

    pub fn get<H: Handler<C>>(&mut self, name: &str, path: &str, handler: H) -> RouteEntry<'_, C> {
        self.route(HandlerKind::Get, name, path, handler)
    }

    pub fn post<H: Handler<C>>(&mut self, name: &str, path: &str, handler: H) -> RouteEntry<'_, C> {
        self.route(HandlerKind::Post, name, path, handler)
    }

    pub fn put<H: Handler<C>>(&mut self, name: &str, path: &str, handler: H) -> RouteEntry<'_, C> {
        self.route(HandlerKind::Put, name, path, handler)
    }

    pub fn delete<H: Handler<C>>(&mut self, name: &str, path: &str, handler: H) -> RouteEntry<'_, C> {
        self.route(HandlerKind::Delete, name, path, handler)
    }

    pub fn options<H: Handler<C>>(&mut self, name: &str, path: &str, handler: H) -> RouteEntry<'_, C> {
        self.route(HandlerKind::Options, name, path, handler)
    }

    /// Declare a controller method as guard middleware for routes under
    /// `path` (every route when `None`).
    pub fn authorize<M>(&mut self, name: &str, path: Option<&str>, guard: M) -> RouteEntry<'_, C>
    where
        M: MiddlewareHandler<C>,
    {
        self.metadata
            .bind(name, HandlerKind::Use, path.unwrap_or(ANY_PATH), None);
        self.handlers
            .insert(name.to_string(), BoundHandler::Guard(Arc::new(guard)));
        RouteEntry {
            table: self,
            name: name.to_string(),
        }
    }

    /// Append middleware to `name`'s chain. May precede the verb declaration.
    pub fn use_middleware<I>(&mut self, name: &str, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.metadata.attach(name, middlewares);
        self
    }
}

/// Handle to the descriptor just declared, for chaining options onto it.
pub struct RouteEntry<'a, C> {
    table: &'a mut RouteTable<C>,
    name: String,
}

impl<C: Send + Sync + 'static> RouteEntry<'_, C> {
    /// Override the success status (200 by default).
    pub fn status(self, status: StatusCode) -> Self {
        self.table.metadata.set_status(&self.name, status);
        self
    }

    /// Append one middleware stage.
    pub fn middleware(self, middleware: Middleware) -> Self {
        self.table.metadata.attach(&self.name, [middleware]);
        self
    }
}
