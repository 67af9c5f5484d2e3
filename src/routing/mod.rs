//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable<C> (built once per controller type)
//!     → path.rs (normalize base and route paths to axum syntax)
//!     → materializer.rs (wrap handlers, layer middleware, check duplicates)
//!     → matcher.rs (scope guards to controller-relative paths)
//!     → axum Router, nested at the controller base path
//! ```
//!
//! # Design Decisions
//! - Routes materialized at startup, immutable at runtime
//! - Route matching itself is left to axum
//! - Configuration mistakes surface as `MaterializeError`, not panics

pub mod matcher;
pub mod materializer;
pub mod path;

pub use materializer::{
    materialize, MaterializeError, MaterializeOptions, MaterializedController, RouteKey, RouteSet,
};
