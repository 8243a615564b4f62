//! Subcommand modules for the `urec` binary.

pub mod gen;
pub mod reconcile;
pub mod utils;
pub mod vote;
