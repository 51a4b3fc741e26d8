//! Tests for the watcher module

use super::filter::ChangeFilter;
use super::session::{execute_on_file_change, settle_loop, WatchOptions};
use crate::error::RemoteError;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_filter_matches_excludes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join(".git/objects")).unwrap();
    let filter = ChangeFilter::new(root, &patterns(&[".git", "*.log", "/build"]));

    assert!(filter.is_ignored(&root.join(".git/objects/ab")));
    assert!(filter.is_ignored(&root.join("logs/run.log")));
    assert!(filter.is_ignored(&root.join("build/out.o")));
    assert!(!filter.is_ignored(&root.join("src/build/mod.rs")));
    assert!(!filter.is_ignored(&root.join("src/main.rs")));
}

#[test]
fn test_filter_paths_outside_root_are_not_ignored() {
    let dir = tempdir().unwrap();
    let filter = ChangeFilter::new(dir.path(), &patterns(&["*"]));
    assert!(!filter.is_ignored(std::path::Path::new("/somewhere/else.txt")));
}

#[test]
fn test_filter_event_needs_all_paths_ignored() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let filter = ChangeFilter::new(root, &patterns(&["*.tmp"]));

    assert!(filter.all_ignored(&[root.join("a.tmp"), root.join("b.tmp")]));
    assert!(!filter.all_ignored(&[root.join("a.tmp"), root.join("b.rs")]));
    assert!(!filter.all_ignored(&[]));
}

#[test]
fn test_settle_loop_debounces_to_one_call() {
    let changed = AtomicBool::new(true);
    let calls = AtomicUsize::new(0);
    let (stop_tx, stop_rx) = channel();

    thread::scope(|scope| {
        let worker = scope.spawn(|| {
            settle_loop(stop_rx, &changed, Duration::from_millis(20), &|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        thread::sleep(Duration::from_millis(150));
        stop_tx.send(()).unwrap();
        worker.join().unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!changed.load(Ordering::SeqCst));
}

#[test]
fn test_settle_loop_survives_callback_errors() {
    let changed = AtomicBool::new(true);
    let calls = AtomicUsize::new(0);
    let (stop_tx, stop_rx) = channel();

    thread::scope(|scope| {
        let worker = scope.spawn(|| {
            settle_loop(stop_rx, &changed, Duration::from_millis(10), &|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RemoteError::Connection("down".into()))
            })
        });
        thread::sleep(Duration::from_millis(50));
        changed.store(true, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        stop_tx.send(()).unwrap();
        worker.join().unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_settle_loop_stops_when_sender_dropped() {
    let changed = AtomicBool::new(false);
    let (stop_tx, stop_rx) = channel::<()>();
    drop(stop_tx);
    settle_loop(stop_rx, &changed, Duration::from_secs(60), &|| Ok(()));
}

#[test]
fn test_session_returns_body_result_and_stops_callbacks() {
    let dir = tempdir().unwrap();
    let calls = AtomicUsize::new(0);
    let mut options = WatchOptions::new(dir.path(), vec![]);
    options.settle_time = Duration::from_millis(50);

    let value = execute_on_file_change(
        &options,
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        || {
            fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
            thread::sleep(Duration::from_millis(400));
            42
        },
    )
    .unwrap();

    assert_eq!(value, 42);
    let after_exit = calls.load(Ordering::SeqCst);
    fs::write(dir.path().join("other.rs"), "").unwrap();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(calls.load(Ordering::SeqCst), after_exit);
}

#[test]
fn test_session_ignored_changes_do_not_trigger() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("target")).unwrap();
    let calls = AtomicUsize::new(0);
    let mut options = WatchOptions::new(dir.path(), patterns(&["target"]));
    options.settle_time = Duration::from_millis(50);

    execute_on_file_change(
        &options,
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        || {
            fs::write(dir.path().join("target/out.bin"), "x").unwrap();
            thread::sleep(Duration::from_millis(300));
        },
    )
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_session_missing_root_is_watch_error() {
    let dir = tempdir().unwrap();
    let options = WatchOptions::new(dir.path().join("missing"), vec![]);
    let result = execute_on_file_change(&options, || Ok(()), || ());
    assert!(matches!(result, Err(RemoteError::Watch(_))));
}
