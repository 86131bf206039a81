//! Clock port for the expiry cutoff.

use chrono::{DateTime, Utc};

/// Provides "now" for cutoff computations.
///
/// Runs read the clock once, so every item in a run is judged against the
/// same instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
