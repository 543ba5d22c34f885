//! Flitsmeister API integration
//!
//! This module provides the typed payloads returned by the Flitsmeister
//! "user" and "statistics" endpoints, the immutable per-refresh snapshot,
//! and the HTTP client that fetches them.

pub mod client;
pub mod types;

pub use client::{FlitsmeisterClient, StatisticsSource};
pub use types::{Auth, Profile, Snapshot, Statistics};
