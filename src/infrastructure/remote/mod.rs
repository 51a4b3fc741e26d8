//! Remote tools
//!
//! Command line builders for ssh and rsync, and the port forwarding tunnel.

mod rsync;
mod ssh;
mod tunnel;

pub use rsync::{RsyncTransfer, TransferOptions};
pub use ssh::{prepare_shell_command, RemoteShell, DEFAULT_SSH_PORT};
pub use tunnel::{PortForwardingSession, TUNNEL_TEARDOWN_TIMEOUT};

use std::time::Instant;

use tracing::info;

/// Run `f` and log how long it took under `label`
pub(crate) fn measure_duration<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    info!(
        "{} done in {:.2} seconds",
        label,
        start.elapsed().as_secs_f64()
    );
    result
}
