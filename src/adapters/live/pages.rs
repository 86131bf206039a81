//! Live page fetcher doing unauthenticated GETs.

use reqwest::header;
use reqwest::Client;

use crate::ports::{Page, PageFetcher, PortError, PortFuture};

/// Fetches public pages over HTTP without credentials.
pub struct LivePageFetcher {
    client: Client,
}

impl LivePageFetcher {
    /// Creates a fetcher with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for LivePageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher for LivePageFetcher {
    fn fetch(&self, url: &str) -> PortFuture<'_, Page> {
        let url = url.to_string();
        Box::pin(async move {
            tracing::debug!(%url, "fetching page");
            let response = self
                .client
                .get(&url)
                .header(header::USER_AGENT, super::USER_AGENT)
                .header(header::ACCEPT, "text/html")
                .send()
                .await
                .map_err(|e| -> PortError { format!("Request to {url} failed: {e}").into() })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| -> PortError { format!("Failed to read {url}: {e}").into() })?;
            Ok(Page { status, body })
        })
    }
}
