//! Release-note compliance for issues closed as completed.
//!
//! A worthy issue (feature, regression, performance work, epic, or highly
//! voted) is covered once a merged pull request linked to it touches the
//! release notes or an upgrade guide. Uncovered issues are reopened and
//! their assignees asked to decide.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RepoRef;
use crate::context::ServiceContext;
use crate::error::TriageError;
use crate::linked_prs::resolve_linked_pull_requests;
use crate::model::{IssueDetails, IssueState, PullState, StateReason};
use crate::ports::IssueEdit;

/// Labels that make an issue release-note worthy on their own.
pub const WORTHY_LABELS: [&str; 4] =
    ["a:feature", "a:regression", "a:performance-improvement", "a:epic"];

/// Reactions at which an issue is worthy regardless of labels.
pub const HIGHLY_VOTED_THRESHOLD: u32 = 20;

/// A maintainer decided the issue needs no release notes.
pub const DECISION_LABEL: &str = "has:release-notes-decision";

/// Release notes exist for the issue.
pub const HAS_NOTES_LABEL: &str = "has:release-notes";

/// The issue awaits a release-notes decision.
pub const PENDING_DECISION_LABEL: &str = "pending:release-notes";

static RELEASE_NOTES_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(subprojects|platforms/documentation)/docs/src/docs/(release/notes\.md|userguide/releases/upgrading/upgrading_version_\d+\.adoc)$",
    )
    .expect("valid release notes pattern")
});

/// Returns `true` if `path` is a release-notes or upgrade-guide file.
#[must_use]
pub fn is_release_notes_path(path: &str) -> bool {
    RELEASE_NOTES_PATH.is_match(path)
}

/// Returns `true` if the issue should be covered by release notes.
///
/// Issues already carrying a decision or a notes label are excluded, since
/// notes may have been written in an unrelated pull request.
#[must_use]
pub fn is_release_note_worthy(issue: &IssueDetails) -> bool {
    let note_worthy = WORTHY_LABELS.iter().any(|label| issue.has_label(label))
        || issue.reactions >= HIGHLY_VOTED_THRESHOLD;
    let excluded = issue.has_label(DECISION_LABEL) || issue.has_label(HAS_NOTES_LABEL);
    note_worthy && !excluded
}

/// Returns `true` if a merged pull request linked to the issue changed the
/// release notes or an upgrade guide.
///
/// # Errors
///
/// Propagates linked-PR resolution failures unchanged; a stale extraction
/// technique must not read as "no coverage".
pub async fn has_release_notes_coverage(
    ctx: &ServiceContext,
    web_url: &str,
    repo: &RepoRef,
    issue_number: u64,
) -> Result<bool, TriageError> {
    let linked = resolve_linked_pull_requests(ctx.pages.as_ref(), web_url, repo, issue_number).await?;
    if linked.is_empty() {
        return Ok(false);
    }

    let numbers: Vec<u64> = linked.into_iter().collect();
    let pulls = ctx
        .tracker
        .pull_request_files(&numbers)
        .await
        .map_err(|source| TriageError::remote("Failed to query linked pull request files", source))?;

    let covered = pulls
        .iter()
        .filter(|pull| pull.state == PullState::Merged)
        .flat_map(|pull| &pull.paths)
        .any(|path| is_release_notes_path(path));
    tracing::debug!(issue = issue_number, covered, "release notes coverage");
    Ok(covered)
}

/// What the release-notes check does to one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseNotesAction {
    /// Leave the issue alone.
    Nothing,
    /// Drop a stale pending-decision label.
    ClearPendingDecision,
    /// Notes exist: record that, dropping the pending label if present.
    MarkCovered {
        /// Whether the pending-decision label is currently set.
        remove_pending: bool,
    },
    /// Reopen and ask the assignees to decide.
    RequestDecision {
        /// Reminder comment.
        comment: String,
    },
}

impl ReleaseNotesAction {
    /// The tracker edits that carry out this action.
    #[must_use]
    pub fn edits(&self) -> Vec<IssueEdit> {
        match self {
            Self::Nothing => Vec::new(),
            Self::ClearPendingDecision => {
                vec![IssueEdit::RemoveLabel { name: PENDING_DECISION_LABEL.into() }]
            }
            Self::MarkCovered { remove_pending } => {
                let mut edits = Vec::new();
                if *remove_pending {
                    edits.push(IssueEdit::RemoveLabel { name: PENDING_DECISION_LABEL.into() });
                }
                edits.push(IssueEdit::AddLabels { names: vec![HAS_NOTES_LABEL.into()] });
                edits
            }
            Self::RequestDecision { comment } => vec![
                IssueEdit::Reopen,
                IssueEdit::Comment { body: comment.clone() },
                IssueEdit::AddLabels { names: vec![PENDING_DECISION_LABEL.into()] },
            ],
        }
    }
}

impl fmt::Display for ReleaseNotesAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("nothing to do"),
            Self::ClearPendingDecision => write!(f, "remove {PENDING_DECISION_LABEL}"),
            Self::MarkCovered { .. } => write!(f, "covered, add {HAS_NOTES_LABEL}"),
            Self::RequestDecision { .. } => {
                write!(f, "not covered, reopen and add {PENDING_DECISION_LABEL}")
            }
        }
    }
}

/// Whether coverage has to be checked before an action can be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triage {
    /// The action is already known.
    Decided(ReleaseNotesAction),
    /// The issue is worthy and closed as completed; coverage decides.
    NeedsCoverage,
}

/// First step of the check: everything that can be decided from the issue alone.
#[must_use]
pub fn triage_issue(issue: &IssueDetails) -> Triage {
    if issue.state != IssueState::Closed {
        return Triage::Decided(ReleaseNotesAction::Nothing);
    }
    if issue.state_reason != Some(StateReason::Completed) || !is_release_note_worthy(issue) {
        let action = if issue.has_label(PENDING_DECISION_LABEL) {
            ReleaseNotesAction::ClearPendingDecision
        } else {
            ReleaseNotesAction::Nothing
        };
        return Triage::Decided(action);
    }
    Triage::NeedsCoverage
}

/// Second step of the check, once coverage is known.
#[must_use]
pub fn action_for_coverage(issue: &IssueDetails, covered: bool) -> ReleaseNotesAction {
    if covered {
        ReleaseNotesAction::MarkCovered { remove_pending: issue.has_label(PENDING_DECISION_LABEL) }
    } else {
        ReleaseNotesAction::RequestDecision { comment: reminder_comment(issue) }
    }
}

fn reminder_comment(issue: &IssueDetails) -> String {
    let mentions: Vec<String> = issue.assignees.iter().map(|login| format!("@{login}")).collect();
    format!(
        "{} This issue was closed as completed and looks release-note worthy, but no PR with release-notes update has been found.
Please, do one of the following:

1. Attach a PR with the release notes update to this issue.
2. Add the `{DECISION_LABEL}` label to the issue if it's not release-note-worthy or it was fixed in an old release and close the issue.
3. Close issue as \"not planned\".
",
        mentions.join(", ")
    )
}

/// Runs the whole check for one issue and returns the chosen action.
///
/// Nothing is changed unless `apply` is set.
///
/// # Errors
///
/// Returns an error if the issue cannot be read, coverage cannot be
/// determined, or an edit fails.
pub async fn check_issue(
    ctx: &ServiceContext,
    web_url: &str,
    repo: &RepoRef,
    number: u64,
    apply: bool,
) -> Result<ReleaseNotesAction, TriageError> {
    let issue = ctx
        .tracker
        .issue(number)
        .await
        .map_err(|source| TriageError::remote(format!("Failed to read issue #{number}"), source))?;

    let action = match triage_issue(&issue) {
        Triage::Decided(action) => action,
        Triage::NeedsCoverage => {
            let covered = has_release_notes_coverage(ctx, web_url, repo, number).await?;
            action_for_coverage(&issue, covered)
        }
    };
    tracing::info!(issue = number, %action, "release notes check");

    let edits = action.edits();
    if apply && !edits.is_empty() {
        ctx.tracker
            .edit_issue(number, &edits)
            .await
            .map_err(|source| TriageError::RemoteMutation { number, source })?;
    }
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(labels: &[&str], reactions: u32) -> IssueDetails {
        IssueDetails {
            number: 1,
            state: IssueState::Closed,
            state_reason: Some(StateReason::Completed),
            labels: labels.iter().map(ToString::to_string).collect(),
            reactions,
            assignees: vec!["alice".into(), "bob".into()],
        }
    }

    #[test]
    fn worthy_by_label_or_votes() {
        assert!(is_release_note_worthy(&issue(&["a:feature"], 0)));
        assert!(is_release_note_worthy(&issue(&["a:bug"], 20)));
        assert!(!is_release_note_worthy(&issue(&["a:bug"], 19)));
    }

    #[test]
    fn decision_or_notes_label_excludes() {
        assert!(!is_release_note_worthy(&issue(&["a:feature", DECISION_LABEL], 30)));
        assert!(!is_release_note_worthy(&issue(&["a:regression", HAS_NOTES_LABEL], 0)));
    }

    #[test]
    fn recognizes_release_notes_and_upgrade_guides() {
        assert!(is_release_notes_path("subprojects/docs/src/docs/release/notes.md"));
        assert!(is_release_notes_path("platforms/documentation/docs/src/docs/release/notes.md"));
        assert!(is_release_notes_path(
            "platforms/documentation/docs/src/docs/userguide/releases/upgrading/upgrading_version_8.adoc"
        ));
        assert!(!is_release_notes_path("subprojects/docs/src/docs/release/notes-template.md"));
        assert!(!is_release_notes_path("README.md"));
    }

    #[test]
    fn open_issues_are_left_alone() {
        let mut open = issue(&["a:feature", PENDING_DECISION_LABEL], 0);
        open.state = IssueState::Open;
        open.state_reason = None;
        assert_eq!(triage_issue(&open), Triage::Decided(ReleaseNotesAction::Nothing));
    }

    #[test]
    fn not_planned_clears_stale_pending_label() {
        let mut closed = issue(&["a:feature", PENDING_DECISION_LABEL], 0);
        closed.state_reason = Some(StateReason::NotPlanned);
        assert_eq!(triage_issue(&closed), Triage::Decided(ReleaseNotesAction::ClearPendingDecision));
    }

    #[test]
    fn worthy_completed_issue_needs_coverage() {
        assert_eq!(triage_issue(&issue(&["a:feature"], 25)), Triage::NeedsCoverage);
    }

    #[test]
    fn covered_issue_gets_notes_label() {
        let action = action_for_coverage(&issue(&["a:feature", PENDING_DECISION_LABEL], 0), true);
        assert_eq!(
            action.edits(),
            vec![
                IssueEdit::RemoveLabel { name: PENDING_DECISION_LABEL.into() },
                IssueEdit::AddLabels { names: vec![HAS_NOTES_LABEL.into()] },
            ]
        );
    }

    #[test]
    fn uncovered_issue_is_reopened_with_mentions() {
        let action = action_for_coverage(&issue(&["a:feature"], 0), false);
        let edits = action.edits();
        assert_eq!(edits[0], IssueEdit::Reopen);
        let IssueEdit::Comment { body } = &edits[1] else {
            panic!("expected a comment, got {:?}", edits[1]);
        };
        assert!(body.starts_with("@alice, @bob This issue was closed as completed"));
        assert!(body.contains("`has:release-notes-decision`"));
        assert_eq!(edits[2], IssueEdit::AddLabels { names: vec![PENDING_DECISION_LABEL.into()] });
    }
}
