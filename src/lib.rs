//! # Auriga - Flitsmeister Driving Statistics Bridge
//!
//! A Rust implementation of a Flitsmeister integration for home automation,
//! polling the driving-statistics API per configured account and exposing
//! the returned fields as read-only, unit-tagged metric values.
//!
//! ## Features
//!
//! - **Async-first**: Tokio runtime with one refresh task per account
//! - **Last-good caching**: metrics freeze at the last successful snapshot
//!   during outages instead of flapping
//! - **Typed failures**: authentication errors block setup and demand
//!   re-authentication; transient errors are retried on the next tick
//! - **Declarative metrics**: a static descriptor table maps snapshot fields
//!   to named, unit-tagged sensor values
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `upstream`: Flitsmeister API client and payload types
//! - `coordinator`: Per-account refresh scheduling and snapshot ownership
//! - `metrics`: Metric descriptor table and read-only metric views
//! - `registry`: Per-account integration lifecycle and teardown

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod upstream;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::RefreshCoordinator;
pub use error::{AurigaError, Result};
pub use upstream::Snapshot;
