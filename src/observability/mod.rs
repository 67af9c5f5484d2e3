//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Materialized routes produce:
//!     → logging.rs (structured log events, request ids via tower-http)
//!     → metrics.rs (per-handler counters and latency histograms)
//!
//! Consumers:
//!     → stdout (human or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
