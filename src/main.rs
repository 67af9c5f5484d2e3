//! routekit demo server
//!
//! Serves two small controllers to show the declaration API end to end.
//!
//! ```text
//!     Client Request
//!         → request id / trace / timeout / body limit (tower-http)
//!         → controller guards (authorize)
//!         → route middleware (declared order)
//!         → DTO validation
//!         → controller method
//!         → JSON response / error translation
//! ```
//!
//! Routes:
//! - `GET  /health`     liveness probe
//! - `POST /echo`       validated echo, answers 201
//! - `GET  /echo/private/{id}`  path parameter echo, requires `x-demo-token`

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use routekit::config::{load_config, ApiConfig};
use routekit::observability::{logging::init_logging, metrics::init_metrics};
use routekit::{validation, Api, ApiError, ApiRequest, Controller, Dto, Middleware, RouteTable};

#[derive(Debug, Parser)]
#[command(name = "routekit-demo", about = "Demo server for the routekit controller framework")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides `server.port`).
    #[arg(short, long)]
    port: Option<u16>,
}

struct HealthController;

impl HealthController {
    async fn check(self: Arc<Self>, _req: ApiRequest) -> Result<Value, ApiError> {
        Ok(json!({ "status": "ok" }))
    }
}

impl Controller for HealthController {
    fn configure(routes: &mut RouteTable<Self>) {
        routes.get("check", "/health", Self::check);
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EchoDto {
    message: String,
    repeat: Option<usize>,
}

impl Dto for EchoDto {
    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string", "minLength": 1 },
                "repeat": { "type": "integer", "minimum": 1, "maximum": 10 }
            },
            "required": ["message"]
        })
    }
}

#[derive(Debug, Serialize)]
struct Echoed {
    echo: String,
    request_id: Option<String>,
}

struct EchoController {
    token: String,
}

impl EchoController {
    async fn echo(self: Arc<Self>, req: ApiRequest) -> Result<Echoed, ApiError> {
        let dto = req
            .validated::<EchoDto>()
            .ok_or_else(|| ApiError::internal("echo body was not validated"))?;

        Ok(Echoed {
            echo: dto.message.repeat(dto.repeat.unwrap_or(1)),
            request_id: req.request_id().map(str::to_owned),
        })
    }

    async fn show(self: Arc<Self>, req: ApiRequest) -> Result<Value, ApiError> {
        let id = req
            .param("id")
            .ok_or_else(|| ApiError::bad_request("missing id"))?;
        Ok(json!({ "id": id }))
    }

    async fn require_token(self: Arc<Self>, req: Request<Body>) -> Result<Request<Body>, ApiError> {
        let authorized = req
            .headers()
            .get("x-demo-token")
            .and_then(|v| v.to_str().ok())
            == Some(self.token.as_str());

        if !authorized {
            return Err(ApiError::unauthorized("missing or invalid x-demo-token"));
        }
        Ok(req)
    }
}

impl Controller for EchoController {
    fn configure(routes: &mut RouteTable<Self>) {
        routes.base_path("/echo");
        routes
            .post("echo", "/", validation::body::<EchoDto, Self, _>(Self::echo))
            .status(StatusCode::CREATED)
            .middleware(Middleware::from_fn("log-echo", |req| async move {
                tracing::info!(path = %req.uri().path(), "Echo requested");
                Ok(req)
            }));
        routes.get("show", "/private/:id", Self::show);
        routes.authorize("require_token", Some("/private"), Self::require_token);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ApiConfig::default(),
    };

    init_logging(&config.observability)?;
    tracing::info!("routekit-demo v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let port = cli.port.unwrap_or(config.server.port);
    let token = std::env::var("DEMO_TOKEN").unwrap_or_else(|_| "demo".to_string());

    let mut api = Api::new(config);
    api.add_controller(HealthController)
        .add_controller(EchoController { token });

    api.listen(port).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
