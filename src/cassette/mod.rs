//! Cassettes: recorded port interactions for deterministic replay.
//!
//! A recording run (`TRIAGE_RECORD=<dir>`) captures every tracker, page and
//! clock call; tests replay those files instead of talking to GitHub.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
