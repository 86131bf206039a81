//! Fixed rule tables for the feedback expiry engine.

use chrono::Duration;

use crate::error::TriageError;
use crate::model::{ClosedLabelIndex, ItemKind};

/// Labels removed alongside the trigger labels when an item is closed.
pub const REMOVE_ON_CLOSE: [&str; 2] = ["to-triage", ":wave: team-triage"];

/// Label search query used to build the closed-label index.
pub const CLOSED_LABEL_QUERY: &str = "closed:";

/// What to do when an item flagged with a trigger label expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackLabelRule {
    /// The `pending:` label that starts the clock.
    pub trigger: &'static str,
    /// Label recording why the item was closed.
    pub close_label: &'static str,
    /// Comment posted when closing.
    pub message: &'static str,
}

/// An ordered rule table for one item kind, with its age cutoff.
///
/// Order matters: when an item carries several trigger labels, the first
/// rule in the table decides the close label and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRules {
    /// Item kind these rules apply to.
    pub kind: ItemKind,
    /// Days without an update before a flagged item is closed.
    pub cutoff_days: i64,
    /// Rules in tie-break order.
    pub rules: Vec<FeedbackLabelRule>,
}

impl FeedbackRules {
    /// Rules for issues: reproducer and feedback requests, 7 days.
    #[must_use]
    pub fn issues() -> Self {
        Self {
            kind: ItemKind::Issue,
            cutoff_days: 7,
            rules: vec![
                FeedbackLabelRule {
                    trigger: "pending:reproducer",
                    close_label: "closed:unreproducible",
                    message: "While we asked for a reproducer, none was provided. If you provide a valid reproducer, we will consider this issue again. In the meantime, closing as unreproducible.",
                },
                FeedbackLabelRule {
                    trigger: "pending:feedback",
                    close_label: "closed:missing-feedback",
                    message: "While we asked for feedback, none was provided. If you provide the requested feedback, we will consider this issue again. In the meantime, closing as missing feedback.",
                },
            ],
        }
    }

    /// Rules for pull requests: DCO sign-off and change requests, 14 days.
    #[must_use]
    pub fn pulls() -> Self {
        Self {
            kind: ItemKind::PullRequest,
            cutoff_days: 14,
            rules: vec![
                FeedbackLabelRule {
                    trigger: "pending:dco",
                    close_label: "closed:missing-dco",
                    message: "While we asked to sign your commits, it has not been done. If you sign your commits, we will consider this pull request again. In the meantime, closing as missing DCO (see the [Developer Certificate of Origin](https://probot.github.io/apps/dco/) GitHub app).",
                },
                FeedbackLabelRule {
                    trigger: "pending:feedback",
                    close_label: "closed:missing-feedback",
                    message: "While we asked for changes to this PR, we received no reaction. If you provide the requested changes, we will consider this pull request again. In the meantime, closing as missing PR feedback.",
                },
            ],
        }
    }

    /// The cutoff as a duration.
    #[must_use]
    pub fn cutoff(&self) -> Duration {
        Duration::days(self.cutoff_days)
    }

    /// Trigger label names in table order.
    #[must_use]
    pub fn triggers(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.trigger).collect()
    }

    /// Returns `true` if `name` is one of this table's trigger labels.
    #[must_use]
    pub fn is_trigger(&self, name: &str) -> bool {
        self.rule_for(name).is_some()
    }

    /// Looks up the rule for a trigger label.
    #[must_use]
    pub fn rule_for(&self, trigger: &str) -> Option<&FeedbackLabelRule> {
        self.rules.iter().find(|rule| rule.trigger == trigger)
    }

    /// Checks that every close label referenced by this table exists.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Config`] naming the first missing close label.
    pub fn validate(&self, index: &ClosedLabelIndex) -> Result<(), TriageError> {
        match self.rules.iter().find(|rule| index.get(rule.close_label).is_none()) {
            Some(rule) => Err(TriageError::Config {
                trigger: rule.trigger.to_string(),
                label: rule.close_label.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    fn index(names: &[&str]) -> ClosedLabelIndex {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Label { id: format!("L{i}"), name: (*name).to_string() })
            .collect()
    }

    #[test]
    fn tables_keep_insertion_order() {
        assert_eq!(FeedbackRules::issues().triggers(), vec!["pending:reproducer", "pending:feedback"]);
        assert_eq!(FeedbackRules::pulls().triggers(), vec!["pending:dco", "pending:feedback"]);
    }

    #[test]
    fn cutoffs_differ_per_kind() {
        assert_eq!(FeedbackRules::issues().cutoff(), Duration::days(7));
        assert_eq!(FeedbackRules::pulls().cutoff(), Duration::days(14));
    }

    #[test]
    fn validate_accepts_complete_index() {
        let index = index(&["closed:unreproducible", "closed:missing-feedback", "closed:missing-dco"]);
        assert!(FeedbackRules::issues().validate(&index).is_ok());
        assert!(FeedbackRules::pulls().validate(&index).is_ok());
    }

    #[test]
    fn validate_names_missing_close_label() {
        let index = index(&["closed:missing-feedback"]);
        let err = FeedbackRules::pulls().validate(&index).unwrap_err();
        assert!(matches!(
            err,
            TriageError::Config { ref trigger, ref label }
                if trigger == "pending:dco" && label == "closed:missing-dco"
        ));
    }
}
