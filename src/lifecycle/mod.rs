//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (Api::serve):
//!     Build route tables → Materialize routers → Bind listener → Serve
//!
//! Shutdown (shutdown.rs / signals.rs):
//!     Signal or trigger → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Route materialization happens before the listener accepts traffic
//! - Any materialization error is fatal: the server never starts half-configured

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
