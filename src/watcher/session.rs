//! File watch session
//!
//! Watches the workspace while a body runs, and calls back once per settle
//! interval in which something changed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use super::filter::ChangeFilter;
use crate::error::{RemoteError, RemoteResult};

/// Default settle time before a burst of changes triggers the callback
pub const DEFAULT_SETTLE_TIME: Duration = Duration::from_secs(1);

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory to watch recursively
    pub root: PathBuf,
    /// Patterns whose changes are not reported
    pub ignores: Vec<String>,
    pub settle_time: Duration,
}

impl WatchOptions {
    pub fn new(root: impl Into<PathBuf>, ignores: Vec<String>) -> Self {
        Self {
            root: root.into(),
            ignores,
            settle_time: DEFAULT_SETTLE_TIME,
        }
    }
}

/// Run `body` while watching `options.root`.
///
/// `callback` runs on a background thread, at most once per settle interval
/// and only if a non-ignored change happened. Its errors are logged. The
/// watcher and the callback thread are both stopped before this returns, so
/// no callback runs after the body's result is handed back.
pub fn execute_on_file_change<C, B, T>(
    options: &WatchOptions,
    callback: C,
    body: B,
) -> RemoteResult<T>
where
    C: Fn() -> RemoteResult<()> + Sync,
    B: FnOnce() -> T,
{
    let changed = Arc::new(AtomicBool::new(false));
    let filter = ChangeFilter::new(&options.root, &options.ignores);

    let flag = Arc::clone(&changed);
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if !filter.all_ignored(&event.paths) {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            Err(e) => debug!("Watch error: {}", e),
        },
        Config::default(),
    )
    .map_err(|e| RemoteError::Watch(format!("Failed to start file watcher: {}", e)))?;

    watcher
        .watch(&options.root, RecursiveMode::Recursive)
        .map_err(|e| {
            RemoteError::Watch(format!(
                "Failed to watch {}: {}",
                options.root.display(),
                e
            ))
        })?;

    let result = thread::scope(|scope| {
        let (stop_tx, stop_rx) = channel();
        let (changed, callback) = (&changed, &callback);
        let settle_time = options.settle_time;
        let worker = scope.spawn(move || settle_loop(stop_rx, changed, settle_time, callback));

        let result = body();

        drop(watcher);
        let _ = stop_tx.send(());
        if worker.join().is_err() {
            warn!("File change handler panicked");
        }
        result
    });
    Ok(result)
}

/// Tick every `settle_time` until told to stop; fire `callback` on ticks
/// that follow a change.
pub(crate) fn settle_loop<C>(
    stop: Receiver<()>,
    changed: &AtomicBool,
    settle_time: Duration,
    callback: &C,
) where
    C: Fn() -> RemoteResult<()>,
{
    loop {
        match stop.recv_timeout(settle_time) {
            Err(RecvTimeoutError::Timeout) => {
                if changed.swap(false, Ordering::SeqCst) {
                    debug!("Local changes detected, resyncing");
                    if let Err(e) = callback() {
                        warn!("Failed to sync local changes: {}", e);
                    }
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
