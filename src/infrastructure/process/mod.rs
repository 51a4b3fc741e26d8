//! Process runners
//!
//! - `SystemRunner` - spawns real child processes
//! - `RecordingRunner` - records command lines, for tests

mod recording;
mod system;

pub use recording::{RecordedCall, RecordingRunner};
pub use system::SystemRunner;
