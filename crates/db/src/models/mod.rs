//! Database entity models and DTOs.

pub mod job;
pub mod status;
