//! Execution backend boundary.
//!
//! The numerical solvers are external executables; this crate defines the
//! [`SolverBackend`] seam the dispatcher talks to and the subprocess-based
//! production implementation.

pub mod executor;
pub mod process;

pub use executor::{ModelFit, ModelRun, SolverBackend, SolverError};
pub use process::ExecutableSolver;
