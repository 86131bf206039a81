//! Live adapters talking to GitHub and the system clock.

pub mod clock;
pub mod github;
pub mod pages;

pub use clock::LiveClock;
pub use github::LiveGitHub;
pub use pages::LivePageFetcher;

/// User agent sent with every request; GitHub rejects requests without one.
pub(crate) const USER_AGENT: &str = concat!("triage/", env!("CARGO_PKG_VERSION"));
