//! Flat-file persistence: the admin Config Document (one JSON file) and the
//! generation log (one JSON record per line).
//!
//! Neither store locks. Two concurrent admin mutations both read, modify and
//! rewrite the whole document, so the later write wins and the earlier change
//! is lost. Log appends go through `O_APPEND` single-line writes.

mod config;
mod log;

pub use config::ConfigStore;
pub use log::LogStore;
