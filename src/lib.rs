//! Controller-based HTTP framework on top of axum.
//!
//! Controllers declare their routes once per type through a [`RouteTable`];
//! an [`Api`] materializes every registered controller into one router and
//! serves it.

pub mod config;
pub mod controller;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod validation;

pub use config::schema::ApiConfig;
pub use controller::{Controller, HandlerKind, Middleware, RouteTable};
pub use http::{Api, ApiError, ApiRequest, ControllerHandle, HttpException, ServerError, Validated};
pub use lifecycle::Shutdown;
pub use routing::MaterializeError;
pub use validation::Dto;
