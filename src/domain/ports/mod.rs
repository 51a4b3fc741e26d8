//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure and config layers provide concrete implementations.

pub mod configuration_medium;
pub mod process_runner;

pub use configuration_medium::ConfigurationMedium;
pub use process_runner::{BackgroundProcess, ProcessRunner, SIGNAL_EXIT_BASE};
