//! Issue tracker port: item queries and mutations.

use serde::{Deserialize, Serialize};

use super::PortFuture;
use crate::model::{ClosedLabelIndex, FeedbackableItem, IssueDetails, ItemKind, PullRequestFiles};

/// One operation of a composite mutation on a single item.
///
/// Operations sent together in one [`IssueTracker::mutate`] call are applied
/// in a single request, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Post a comment.
    AddComment {
        /// Markdown body.
        body: String,
    },
    /// Close the item. Issues are closed as not planned.
    Close {
        /// Decides which close mutation applies.
        kind: ItemKind,
    },
    /// Attach labels by node id.
    AddLabels {
        /// Label node ids.
        label_ids: Vec<String>,
    },
    /// Detach labels by node id. Absent labels are ignored.
    RemoveLabels {
        /// Label node ids.
        label_ids: Vec<String>,
    },
}

/// A by-name edit on an issue, addressed by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IssueEdit {
    /// Add labels by name.
    AddLabels {
        /// Label names.
        names: Vec<String>,
    },
    /// Remove one label by name; removing an absent label succeeds.
    RemoveLabel {
        /// Label name.
        name: String,
    },
    /// Reopen a closed issue.
    Reopen,
    /// Post a comment.
    Comment {
        /// Markdown body.
        body: String,
    },
}

/// Reads from and writes to the repository's issue tracker.
///
/// An implementation is bound to a single repository.
pub trait IssueTracker: Send + Sync {
    /// Returns up to 100 items of `kind` carrying any of `labels`, each with
    /// its labels and trailing timeline window.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn feedback_items(&self, kind: ItemKind, labels: &[&str])
        -> PortFuture<'_, Vec<FeedbackableItem>>;

    /// Returns every label whose name matches `query`, indexed by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn closed_labels(&self, query: &str) -> PortFuture<'_, ClosedLabelIndex>;

    /// Applies `mutations` to the item with node id `item_id` in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the tracker rejects it.
    fn mutate(&self, item_id: &str, mutations: &[Mutation]) -> PortFuture<'_, ()>;

    /// Returns the state, labels, reactions and assignees of one issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the issue does not exist.
    fn issue(&self, number: u64) -> PortFuture<'_, IssueDetails>;

    /// Returns merge state and changed paths for each pull request, in one
    /// batched request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn pull_request_files(&self, numbers: &[u64]) -> PortFuture<'_, Vec<PullRequestFiles>>;

    /// Applies by-name edits to an issue, in order.
    ///
    /// # Errors
    ///
    /// Returns an error on the first edit the tracker rejects.
    fn edit_issue(&self, number: u64, edits: &[IssueEdit]) -> PortFuture<'_, ()>;
}
