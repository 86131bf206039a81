//! Recording adapter for the `PageFetcher` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::{Page, PageFetcher, PortFuture};

/// Records page fetches while delegating to an inner fetcher.
pub struct RecordingPageFetcher {
    inner: Box<dyn PageFetcher>,
    recorder: SharedRecorder,
}

impl RecordingPageFetcher {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn PageFetcher>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct FetchInput {
    url: String,
}

impl PageFetcher for RecordingPageFetcher {
    fn fetch(&self, url: &str) -> PortFuture<'_, Page> {
        let input = FetchInput { url: url.to_string() };
        let call = self.inner.fetch(url);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "pages", "fetch", &input, &result);
            result
        })
    }
}
