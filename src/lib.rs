//! Probabilistic record-linkage engine for a Master Patient Index.
//!
//! - PII normalization and skip-value cleaning (`pii`)
//! - Blocking-key extraction (`blocking`)
//! - Multi-pass probabilistic scoring and algorithm configuration (`matching`)
//! - PostgreSQL persistence via Diesel (`db`)
//! - RESTful API via Axum, with a thin FHIR input adapter (`api`)
//! - Distributed tracing and observability via OpenTelemetry (`observability`)

pub mod api;
pub mod blocking;
pub mod config;
pub mod db;
pub mod error;
pub mod matching;
pub mod models;
pub mod observability;
pub mod pii;

pub use error::{Error, Result};
