//! Background execution engine.

pub mod dispatcher;

pub use dispatcher::JobDispatcher;
