//! File watcher for resyncing while a remote command runs
//!
//! - Gitignore-style filtering of changes (push excludes)
//! - One callback per settle interval, however many events arrived
//! - Watcher and callback thread joined before the session returns

mod filter;
mod session;
#[cfg(test)]
mod tests;

pub use filter::ChangeFilter;
pub use session::{execute_on_file_change, WatchOptions, DEFAULT_SETTLE_TIME};
