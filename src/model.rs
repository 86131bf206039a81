//! Domain types read from the issue tracker.
//!
//! Everything here is fetched fresh at the start of a run and discarded at
//! the end; the tracker itself is the durable store.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of an item's timeline, reduced to who acted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// A label was applied.
    Labeled {
        /// Name of the applied label.
        label_name: String,
        /// Login of whoever applied it.
        actor: Option<String>,
        /// When the label was applied.
        created_at: DateTime<Utc>,
    },
    /// The item was closed.
    Closed {
        /// Login of whoever closed it.
        actor: Option<String>,
    },
    /// A comment was posted.
    Comment {
        /// Login of the comment author.
        author: Option<String>,
    },
    /// The title was changed.
    RenamedTitle {
        /// Login of whoever renamed it.
        actor: Option<String>,
    },
    /// A commit was pushed to the pull request. The identity is the pull
    /// request's author, not the commit author.
    Commit {
        /// Login of the pull request author.
        author: Option<String>,
    },
    /// A review was submitted.
    Review {
        /// Login of the reviewer.
        author: Option<String>,
    },
    /// A draft was marked ready for review.
    ReadyForReview {
        /// Login of whoever marked it ready.
        actor: Option<String>,
    },
    /// A review was requested.
    ReviewRequested {
        /// Login of whoever requested the review.
        actor: Option<String>,
    },
}

impl TimelineEvent {
    /// The login of whoever performed this event, if GitHub still knows it.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Labeled { actor, .. }
            | Self::Closed { actor }
            | Self::RenamedTitle { actor }
            | Self::ReadyForReview { actor }
            | Self::ReviewRequested { actor } => actor.as_deref(),
            Self::Comment { author } | Self::Commit { author } | Self::Review { author } => {
                author.as_deref()
            }
        }
    }

    /// The label name if this is a label event.
    #[must_use]
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Self::Labeled { label_name, .. } => Some(label_name),
            _ => None,
        }
    }
}

/// A label attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Opaque node id used by mutations.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Which kind of item is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// An issue; closed with the "not planned" reason.
    Issue,
    /// A pull request; closed without a reason.
    PullRequest,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => f.write_str("issue"),
            Self::PullRequest => f.write_str("pull request"),
        }
    }
}

/// An issue or pull request carrying feedback labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackableItem {
    /// Issue or pull request.
    pub kind: ItemKind,
    /// Opaque node id.
    pub id: String,
    /// Human-facing number.
    pub number: u64,
    /// Last update time as reported by the tracker.
    pub updated_at: DateTime<Utc>,
    /// Whether the item is already closed.
    #[serde(default)]
    pub closed: bool,
    /// All labels on the item, in tracker order.
    pub labels: Vec<Label>,
    /// Trailing window of timeline events, oldest first.
    pub timeline: Vec<TimelineEvent>,
}

impl FeedbackableItem {
    /// Returns `true` if the item carries a label with this name.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }
}

/// Closed-reason label names mapped to their node ids.
///
/// Built once per run and shared read-only by every item evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClosedLabelIndex(HashMap<String, String>);

impl ClosedLabelIndex {
    /// Returns the node id of the named label.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of indexed labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no labels are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Label> for ClosedLabelIndex {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().map(|label| (label.name, label.id)).collect())
    }
}

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    /// Open.
    Open,
    /// Closed.
    Closed,
}

/// Why an issue was closed (or reopened).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateReason {
    /// Closed as done.
    Completed,
    /// Closed as not planned.
    NotPlanned,
    /// Closed as a duplicate.
    Duplicate,
    /// Reopened after having been closed.
    Reopened,
}

/// The parts of a single issue the release-note check looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    /// Issue number.
    pub number: u64,
    /// Current state.
    pub state: IssueState,
    /// Close (or reopen) reason, if any.
    pub state_reason: Option<StateReason>,
    /// Label names.
    pub labels: Vec<String>,
    /// Total reaction count.
    pub reactions: u32,
    /// Assignee logins.
    pub assignees: Vec<String>,
}

impl IssueDetails {
    /// Returns `true` if the issue carries a label with this name.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}

/// Merge state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullState {
    /// Open.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged.
    Merged,
}

/// A pull request's merge state and changed paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFiles {
    /// Pull request number.
    pub number: u64,
    /// Merge state.
    pub state: PullState,
    /// Changed file paths (first 100).
    pub paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_reads_actor_or_author() {
        let comment = TimelineEvent::Comment { author: Some("alice".into()) };
        let closed = TimelineEvent::Closed { actor: Some("bob".into()) };
        let ghost = TimelineEvent::Review { author: None };
        assert_eq!(comment.identity(), Some("alice"));
        assert_eq!(closed.identity(), Some("bob"));
        assert_eq!(ghost.identity(), None);
    }

    #[test]
    fn timeline_event_yaml_shape() {
        let event = TimelineEvent::Labeled {
            label_name: "pending:feedback".into(),
            actor: Some("maintainer".into()),
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let yaml = serde_yaml::to_string(&event).unwrap();
        assert!(yaml.contains("kind: labeled"));
        assert!(yaml.contains("label_name: pending:feedback"));
    }

    #[test]
    fn closed_label_index_maps_names_to_ids() {
        let index: ClosedLabelIndex = vec![
            Label { id: "L1".into(), name: "closed:missing-feedback".into() },
            Label { id: "L2".into(), name: "closed:unreproducible".into() },
        ]
        .into_iter()
        .collect();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("closed:unreproducible"), Some("L2"));
        assert_eq!(index.get("closed:duplicate"), None);
    }
}
