//! HTTP surface and background dispatch engine for the BMDS job runner.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
