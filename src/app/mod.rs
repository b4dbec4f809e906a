//! Demo host application
//!
//! Drives a simulated client through the callback bridge: library threads on
//! one side, a single-threaded host loop on the other.

pub mod cli;
pub mod host;
pub mod registry;
pub mod simulator;
pub mod startup;
pub mod summary;
