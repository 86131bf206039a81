//! Recording adapter for the `IssueTracker` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::model::{ClosedLabelIndex, FeedbackableItem, IssueDetails, ItemKind, PullRequestFiles};
use crate::ports::{IssueEdit, IssueTracker, Mutation, PortFuture};

/// Records tracker calls while delegating to an inner tracker.
pub struct RecordingIssueTracker {
    inner: Box<dyn IssueTracker>,
    recorder: SharedRecorder,
}

impl RecordingIssueTracker {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn IssueTracker>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct FeedbackItemsInput {
    kind: ItemKind,
    labels: Vec<String>,
}

#[derive(Serialize)]
struct ClosedLabelsInput {
    query: String,
}

#[derive(Serialize)]
struct MutateInput {
    item_id: String,
    mutations: Vec<Mutation>,
}

#[derive(Serialize)]
struct IssueInput {
    number: u64,
}

#[derive(Serialize)]
struct PullRequestFilesInput {
    numbers: Vec<u64>,
}

#[derive(Serialize)]
struct EditIssueInput {
    number: u64,
    edits: Vec<IssueEdit>,
}

impl IssueTracker for RecordingIssueTracker {
    fn feedback_items(
        &self,
        kind: ItemKind,
        labels: &[&str],
    ) -> PortFuture<'_, Vec<FeedbackableItem>> {
        let input =
            FeedbackItemsInput { kind, labels: labels.iter().map(ToString::to_string).collect() };
        let call = self.inner.feedback_items(kind, labels);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "feedback_items", &input, &result);
            result
        })
    }

    fn closed_labels(&self, query: &str) -> PortFuture<'_, ClosedLabelIndex> {
        let input = ClosedLabelsInput { query: query.to_string() };
        let call = self.inner.closed_labels(query);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "closed_labels", &input, &result);
            result
        })
    }

    fn mutate(&self, item_id: &str, mutations: &[Mutation]) -> PortFuture<'_, ()> {
        let input = MutateInput { item_id: item_id.to_string(), mutations: mutations.to_vec() };
        let call = self.inner.mutate(item_id, mutations);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "mutate", &input, &result);
            result
        })
    }

    fn issue(&self, number: u64) -> PortFuture<'_, IssueDetails> {
        let call = self.inner.issue(number);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "issue", &IssueInput { number }, &result);
            result
        })
    }

    fn pull_request_files(&self, numbers: &[u64]) -> PortFuture<'_, Vec<PullRequestFiles>> {
        let input = PullRequestFilesInput { numbers: numbers.to_vec() };
        let call = self.inner.pull_request_files(numbers);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "pull_request_files", &input, &result);
            result
        })
    }

    fn edit_issue(&self, number: u64, edits: &[IssueEdit]) -> PortFuture<'_, ()> {
        let input = EditIssueInput { number, edits: edits.to_vec() };
        let call = self.inner.edit_issue(number, edits);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "tracker", "edit_issue", &input, &result);
            result
        })
    }
}
