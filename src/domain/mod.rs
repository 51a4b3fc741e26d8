//! Domain Layer
//!
//! Pure data and interfaces, without process or file I/O.
//!
//! ## Structure
//!
//! - `entities/` - Endpoints and resolved workspace configuration
//! - `value_objects/` - Sync rules, port forwards, selectors, stream targets
//! - `ports/` - Interface definitions for infrastructure (process runner, config medium)

pub mod entities;
pub mod ports;
pub mod value_objects;
