//! Domain Value Objects
//!
//! Immutable value types that describe what the tools are asked to do.

mod communication;
mod forwarding;
mod selector;
mod sync_rules;
mod verbosity;

pub use communication::{Communication, StreamTarget};
pub use forwarding::ForwardingOption;
pub use selector::HostSelector;
pub use sync_rules::{CompiledRules, Direction, SyncRules};
pub use verbosity::Verbosity;
