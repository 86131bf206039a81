//! Page fetcher port for public web pages.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// A fetched page. Non-success statuses are returned, not raised, so the
/// caller decides what a failure means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Performs unauthenticated GET requests for public pages.
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    fn fetch(&self, url: &str) -> PortFuture<'_, Page>;
}
