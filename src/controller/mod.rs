//! Controller declaration subsystem.
//!
//! # Data Flow
//! ```text
//! Controller::configure (once per type)
//!     → table.rs (verb / use_middleware / authorize calls)
//!     → metadata.rs (merge into one descriptor per handler name)
//!     → registry.rs (table cached by TypeId, shared by all instances)
//!     → routing::materializer at server start
//! ```
//!
//! # Design Decisions
//! - Explicit builder calls instead of annotations
//! - Handler names are the identity key of a descriptor
//! - Tables are immutable once built

pub mod descriptor;
pub mod handler;
pub mod metadata;
pub mod registry;
pub mod table;

pub use descriptor::{HandlerKind, Middleware, RouteDescriptor};
pub use handler::{Handler, MiddlewareHandler};
pub use metadata::ControllerMetadata;
pub use registry::ControllerRegistry;
pub use table::{Controller, RouteEntry, RouteTable};
