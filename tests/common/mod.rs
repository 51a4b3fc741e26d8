//! Common test utilities for remote CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project, home and "remote" directories
//! - a fake `ssh` on `PATH` that runs remote commands locally

pub mod env;

pub use env::*;
