//! Replaying adapter for the `PageFetcher` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Page, PageFetcher, PortFuture};

/// Serves recorded pages.
pub struct ReplayingPageFetcher {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingPageFetcher {
    /// Creates a replaying fetcher from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl PageFetcher for ReplayingPageFetcher {
    fn fetch(&self, _url: &str) -> PortFuture<'_, Page> {
        let output = next_output(&self.replayer, "pages", "fetch");
        Box::pin(async move { replay_result(output) })
    }
}
