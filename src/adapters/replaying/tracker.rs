//! Replaying adapter for the `IssueTracker` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::model::{ClosedLabelIndex, FeedbackableItem, IssueDetails, ItemKind, PullRequestFiles};
use crate::ports::{IssueEdit, IssueTracker, Mutation, PortFuture};

/// Serves recorded tracker results. Inputs are not checked.
pub struct ReplayingIssueTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIssueTracker {
    /// Creates a replaying tracker from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: serde::de::DeserializeOwned + Send + 'static>(
        &self,
        method: &str,
    ) -> PortFuture<'_, T> {
        let output = next_output(&self.replayer, "tracker", method);
        Box::pin(async move { replay_result(output) })
    }
}

impl IssueTracker for ReplayingIssueTracker {
    fn feedback_items(
        &self,
        _kind: ItemKind,
        _labels: &[&str],
    ) -> PortFuture<'_, Vec<FeedbackableItem>> {
        self.replay("feedback_items")
    }

    fn closed_labels(&self, _query: &str) -> PortFuture<'_, ClosedLabelIndex> {
        self.replay("closed_labels")
    }

    fn mutate(&self, _item_id: &str, _mutations: &[Mutation]) -> PortFuture<'_, ()> {
        self.replay("mutate")
    }

    fn issue(&self, _number: u64) -> PortFuture<'_, IssueDetails> {
        self.replay("issue")
    }

    fn pull_request_files(&self, _numbers: &[u64]) -> PortFuture<'_, Vec<PullRequestFiles>> {
        self.replay("pull_request_files")
    }

    fn edit_issue(&self, _number: u64, _edits: &[IssueEdit]) -> PortFuture<'_, ()> {
        self.replay("edit_issue")
    }
}
