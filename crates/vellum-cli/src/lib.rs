//! Vellum CLI library
//!
//! Argument parsing, note discovery and the run loop behind the `vellum`
//! binary.

pub mod cli;
pub mod discover;
pub mod run;

pub use run::{run, RunResult};
