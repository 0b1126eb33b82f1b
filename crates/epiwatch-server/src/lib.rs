//! EpiWatch Server - HTTP surface and CLI over the refresh pipeline.
//!
//! Provides:
//! - An axum router exposing the three refresh operations and a health check
//! - The `epiwatch` binary: `serve` runs the HTTP service, `refresh` runs a
//!   single pipeline pass from the command line

pub mod cli;
pub mod routes;
