//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the triage core and an external
//! system (time, the issue tracker, public web pages). Implementations live
//! in `src/adapters/`.

pub mod clock;
pub mod pages;
pub mod tracker;

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

pub use clock::Clock;
pub use pages::{Page, PageFetcher};
pub use tracker::{IssueEdit, IssueTracker, Mutation};

/// Error type returned by every port.
pub type PortError = Box<dyn Error + Send + Sync>;

/// Boxed future type alias used by async ports to keep them dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;
