//! Rule-constrained exam paper assembly.
//!
//! `assembly` is the engine (validation, candidate filtering, genetic and greedy selection,
//! score allocation). The remaining modules wrap it into an axum service.

pub mod assembly;
pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod store;
pub mod subjects;
pub mod telemetry;
