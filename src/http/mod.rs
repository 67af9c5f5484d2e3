//! HTTP surface of the framework.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, timeout, tracing)
//!     → [materialized controller routers] (crate::routing)
//!     → request.rs (params, query, parsed body)
//!     → controller handler
//!     → response.rs (status override, JSON body, error translation)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ApiError, HttpException};
pub use request::{ApiRequest, RequestSection, Validated, X_REQUEST_ID};
pub use response::{send, send_error};
pub use server::{Api, ControllerHandle, ServerError};
