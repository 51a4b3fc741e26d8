//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer spawns every external process.
//!
//! ## Structure
//!
//! - `process/` - Process runners (system, recording)
//! - `remote/` - ssh and rsync command lines, port forwarding tunnel

pub mod process;
pub mod remote;

pub use process::{RecordedCall, RecordingRunner, SystemRunner};
pub use remote::{PortForwardingSession, RemoteShell, RsyncTransfer, TransferOptions};
