//! Terminal output for the `remote` binary

pub mod error;
pub mod logging;
