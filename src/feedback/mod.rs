//! Feedback expiry: close items whose `pending:` request went unanswered.
//!
//! Every labeled item ends up in one of three states:
//!
//! - **responded**: someone other than the requester acted after the flag;
//!   the trigger labels are removed.
//! - **expired**: no response and no update within the cutoff; the item is
//!   commented on, closed and relabeled in one mutation.
//! - **pending**: neither; nothing happens.
//!
//! A response always wins over an elapsed deadline.

pub mod rules;

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::context::ServiceContext;
use crate::error::TriageError;
use crate::model::{ClosedLabelIndex, FeedbackableItem, ItemKind};
use crate::ports::{IssueTracker, Mutation};
use crate::timeline::was_responded_to_after_flagging;

pub use rules::{FeedbackLabelRule, FeedbackRules, CLOSED_LABEL_QUERY, REMOVE_ON_CLOSE};

/// The decision for a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackAction {
    /// Someone responded; remove the trigger labels.
    Responded {
        /// Node ids of the trigger labels on the item.
        label_ids: Vec<String>,
    },
    /// The request expired; close the item.
    Expired {
        /// Trigger label whose rule applies.
        main_label: String,
        /// Comment to post.
        message: String,
        /// Node id of the close label to add.
        close_label_id: String,
        /// Node ids of the trigger and triage labels to remove.
        remove_label_ids: Vec<String>,
    },
    /// Still waiting.
    Pending,
}

impl FeedbackAction {
    /// The mutations carrying out this action on an item of `kind`.
    ///
    /// Empty when there is nothing to change.
    #[must_use]
    pub fn mutations(&self, kind: ItemKind) -> Vec<Mutation> {
        match self {
            Self::Responded { label_ids } if !label_ids.is_empty() => {
                vec![Mutation::RemoveLabels { label_ids: label_ids.clone() }]
            }
            Self::Responded { .. } | Self::Pending => Vec::new(),
            Self::Expired { message, close_label_id, remove_label_ids, .. } => vec![
                Mutation::AddComment { body: message.clone() },
                Mutation::Close { kind },
                Mutation::AddLabels { label_ids: vec![close_label_id.clone()] },
                Mutation::RemoveLabels { label_ids: remove_label_ids.clone() },
            ],
        }
    }
}

/// Decides what to do with one item.
///
/// `now - cutoff` is the expiry threshold; an item last updated before it
/// expires. Closed items are never closed again.
///
/// # Errors
///
/// Returns [`TriageError::Config`] if the expiring rule's close label is not
/// in `index`.
pub fn plan_action(
    item: &FeedbackableItem,
    rules: &FeedbackRules,
    index: &ClosedLabelIndex,
    now: DateTime<Utc>,
) -> Result<FeedbackAction, TriageError> {
    if was_responded_to_after_flagging(&item.timeline) {
        let label_ids = item
            .labels
            .iter()
            .filter(|label| rules.is_trigger(&label.name))
            .map(|label| label.id.clone())
            .collect();
        return Ok(FeedbackAction::Responded { label_ids });
    }

    if item.closed || item.updated_at >= now - rules.cutoff() {
        return Ok(FeedbackAction::Pending);
    }

    let Some(rule) = rules.rules.iter().find(|rule| item.has_label(rule.trigger)) else {
        return Ok(FeedbackAction::Pending);
    };
    let close_label_id = index.get(rule.close_label).ok_or_else(|| TriageError::Config {
        trigger: rule.trigger.to_string(),
        label: rule.close_label.to_string(),
    })?;
    let remove_label_ids = item
        .labels
        .iter()
        .filter(|label| rules.is_trigger(&label.name) || REMOVE_ON_CLOSE.contains(&label.name.as_str()))
        .map(|label| label.id.clone())
        .collect();

    Ok(FeedbackAction::Expired {
        main_label: rule.trigger.to_string(),
        message: rule.message.to_string(),
        close_label_id: close_label_id.to_string(),
        remove_label_ids,
    })
}

/// An action bound to the item it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    /// Issue or pull request.
    pub kind: ItemKind,
    /// Item number.
    pub number: u64,
    /// Item node id.
    pub item_id: String,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
    /// What to do.
    pub action: FeedbackAction,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            FeedbackAction::Responded { .. } => {
                write!(f, "REMOVE LABELS {} #{}: updated after labeling", self.kind, self.number)
            }
            FeedbackAction::Expired { main_label, .. } => write!(
                f,
                "CLOSE {} #{}: last updated {} with label {main_label}",
                self.kind,
                self.number,
                self.updated_at.to_rfc3339()
            ),
            FeedbackAction::Pending => write!(f, "PENDING {} #{}", self.kind, self.number),
        }
    }
}

/// Plans every item of one rule table.
///
/// # Errors
///
/// Returns the first configuration error encountered.
pub fn plan_items(
    items: &[FeedbackableItem],
    rules: &FeedbackRules,
    index: &ClosedLabelIndex,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedAction>, TriageError> {
    items
        .iter()
        .map(|item| {
            Ok(PlannedAction {
                kind: item.kind,
                number: item.number,
                item_id: item.id.clone(),
                updated_at: item.updated_at,
                action: plan_action(item, rules, index, now)?,
            })
        })
        .collect()
}

/// Sends every planned mutation concurrently and waits for all of them.
///
/// A failure on one item does not stop the others.
///
/// # Errors
///
/// Returns the first failure in plan order once every call has finished.
pub async fn dispatch(
    tracker: &dyn IssueTracker,
    planned: &[PlannedAction],
) -> Result<(), TriageError> {
    let calls = planned.iter().filter_map(move |plan| {
        let mutations = plan.action.mutations(plan.kind);
        (!mutations.is_empty()).then(|| async move {
            let result = tracker.mutate(&plan.item_id, &mutations).await;
            match &result {
                Ok(()) => tracing::info!("{plan}"),
                Err(e) => tracing::warn!(number = plan.number, error = %e, "mutation failed"),
            }
            result.map_err(|source| TriageError::RemoteMutation { number: plan.number, source })
        })
    });

    join_all(calls).await.into_iter().find_map(Result::err).map_or(Ok(()), Err)
}

/// Runs feedback expiry for every table: issues and pull requests alike.
///
/// The closed-label index is fetched once and every table is validated
/// against it before anything is changed. With `dry_run`, actions are
/// planned but not sent.
///
/// # Errors
///
/// Returns configuration and query errors immediately, and the first
/// mutation error after all items have been processed.
pub async fn run(
    ctx: &ServiceContext,
    tables: &[FeedbackRules],
    dry_run: bool,
) -> Result<Vec<PlannedAction>, TriageError> {
    let now = ctx.clock.now();
    let index = ctx
        .tracker
        .closed_labels(CLOSED_LABEL_QUERY)
        .await
        .map_err(|source| TriageError::remote("Failed to fetch closed labels", source))?;
    tracing::debug!(labels = index.len(), "closed label index");

    for rules in tables {
        rules.validate(&index)?;
    }

    let mut planned = Vec::new();
    for rules in tables {
        let items = ctx
            .tracker
            .feedback_items(rules.kind, &rules.triggers())
            .await
            .map_err(|source| {
                TriageError::remote(format!("Failed to fetch labeled {} items", rules.kind), source)
            })?;
        tracing::info!(kind = %rules.kind, count = items.len(), "fetched labeled items");
        planned.extend(plan_items(&items, rules, &index, now)?);
    }

    if !dry_run {
        dispatch(ctx.tracker.as_ref(), &planned).await?;
    }
    Ok(planned)
}

/// Formats planned actions as a report, skipping pending items.
#[must_use]
pub fn format_actions(planned: &[PlannedAction]) -> String {
    let mut report = String::new();
    for plan in planned.iter().filter(|plan| plan.action != FeedbackAction::Pending) {
        let _ = writeln!(report, "  {plan}");
    }
    let pending = planned.iter().filter(|plan| plan.action == FeedbackAction::Pending).count();
    let _ = write!(report, "  {pending} item(s) still pending");
    report
}
