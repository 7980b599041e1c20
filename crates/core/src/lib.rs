//! Pure domain logic for the BMDS job runner.
//!
//! Everything in this crate is side-effect free: schema tables, the
//! validation pipeline, the model registry, and the typed request/output
//! models. No database or HTTP dependencies — the `db` and `api` crates
//! build on top of these types.

pub mod error;
pub mod models;
pub mod outputs;
pub mod request;
pub mod schema;
pub mod types;
pub mod validation;
