//! Request handlers.

pub mod jobs;
