//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Hold the controller list and configuration
//! - Materialize every controller into one axum Router at start time
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Bind the listener and serve with graceful shutdown

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::controller::registry::ControllerRegistry;
use crate::controller::table::Controller;
use crate::lifecycle::shutdown_signal;
use crate::routing::materializer::{
    materialize, MaterializeError, MaterializeOptions, MaterializedController, RouteSet,
};
use crate::routing::path::join;
use crate::validation::ValidationMessages;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

/// Object-safe view of a controller instance.
trait MountController: Send + Sync {
    fn mount(
        &self,
        registry: &mut ControllerRegistry,
        options: &MaterializeOptions,
    ) -> Result<MaterializedController, MaterializeError>;
}

struct Mounted<C>(Arc<C>);

impl<C: Controller> MountController for Mounted<C> {
    fn mount(
        &self,
        registry: &mut ControllerRegistry,
        options: &MaterializeOptions,
    ) -> Result<MaterializedController, MaterializeError> {
        let table = registry.table::<C>();
        materialize(Arc::clone(&self.0), &table, options)
    }
}

/// A controller instance of any type, ready to be registered.
pub struct ControllerHandle(Box<dyn MountController>);

impl ControllerHandle {
    pub fn new<C: Controller>(controller: C) -> Self {
        Self::shared(Arc::new(controller))
    }

    pub fn shared<C: Controller>(controller: Arc<C>) -> Self {
        Self(Box::new(Mounted(controller)))
    }
}

/// Controllers mounted at the same base path.
struct MountGroup {
    base_path: Option<String>,
    router: Router,
}

/// Controller-based HTTP API.
pub struct Api {
    config: ApiConfig,
    registry: ControllerRegistry,
    controllers: Vec<ControllerHandle>,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl Api {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            registry: ControllerRegistry::new(),
            controllers: Vec::new(),
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Replace every registered controller.
    pub fn set_controllers<I>(&mut self, controllers: I) -> &mut Self
    where
        I: IntoIterator<Item = ControllerHandle>,
    {
        self.controllers = controllers.into_iter().collect();
        self
    }

    /// Register one more controller.
    pub fn add_controller<C: Controller>(&mut self, controller: C) -> &mut Self {
        self.controllers.push(ControllerHandle::new(controller));
        self
    }

    /// Register a controller instance that is also used elsewhere.
    pub fn add_shared_controller<C: Controller>(&mut self, controller: Arc<C>) -> &mut Self {
        self.controllers.push(ControllerHandle::shared(controller));
        self
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Materialize every controller and return the application router.
    pub fn router(&mut self) -> Result<Router, ServerError> {
        let options = MaterializeOptions {
            body_limit: self.config.limits.max_body_size,
        };

        let mut groups: Vec<MountGroup> = Vec::new();
        // Full paths across every controller; nesting and merging would
        // otherwise panic on overlaps between base paths.
        let mut registered = RouteSet::new();
        for handle in &self.controllers {
            let mounted = handle.0.mount(&mut self.registry, &options)?;

            let idx = match groups.iter().position(|g| g.base_path == mounted.base_path) {
                Some(idx) => idx,
                None => {
                    groups.push(MountGroup {
                        base_path: mounted.base_path.clone(),
                        router: Router::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[idx];

            for (key, handler) in &mounted.routes {
                let full_path = join(group.base_path.as_deref(), &key.path);
                registered.insert(mounted.controller, handler, key.kind, &full_path)?;
            }

            group.router = std::mem::take(&mut group.router).merge(mounted.router);
            tracing::info!(
                controller = mounted.controller,
                base_path = mounted.base_path.as_deref().unwrap_or("/"),
                "Controller mounted"
            );
        }

        let mut app = Router::new();
        for group in groups {
            app = match group.base_path {
                None => app.merge(group.router),
                Some(base) => app.nest(&base, group.router),
            };
        }

        Ok(self.apply_layers(app))
    }

    /// Wrap the application with the server-wide middleware stack.
    #[allow(deprecated)]
    fn apply_layers(&self, app: Router) -> Router {
        let messages = ValidationMessages::new(self.config.validation.unexpected_field_message.clone());

        app.layer(Extension(messages)).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs))),
        )
    }

    /// Bind `host:port` from config and serve until a shutdown signal.
    pub async fn run(self) -> Result<(), ServerError> {
        let port = self.config.server.port;
        self.listen(port).await
    }

    /// Bind the configured host on `port` and serve until a shutdown signal.
    pub async fn listen(self, port: u16) -> Result<(), ServerError> {
        let address = match self.config.server.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, port).to_string(),
            Err(_) => format!("{}:{}", self.config.server.host, port),
        };

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C / SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve_with_shutdown<F>(mut self, listener: TcpListener, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        let addr = listener.local_addr()?;

        tracing::info!(
            address = %addr,
            controllers = self.controllers.len(),
            "HTTP server starting"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
