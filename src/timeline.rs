//! Detects whether a flagged item got a response from someone else.

use std::collections::HashSet;

use crate::model::TimelineEvent;

/// Label prefix marking an item as awaiting external input.
pub const PENDING_PREFIX: &str = "pending:";

/// Returns `true` if anyone other than the requester acted after the most
/// recent `pending:` label was applied.
///
/// Events are scanned newest first up to the flagging label. Identities that
/// GitHub no longer knows (deleted accounts) count as someone else. When the
/// visible window holds no `pending:` label, every event in it counts.
#[must_use]
pub fn was_responded_to_after_flagging(events: &[TimelineEvent]) -> bool {
    let mut responders: HashSet<Option<&str>> = HashSet::new();
    let mut requester = None;

    for event in events.iter().rev() {
        if event.label_name().is_some_and(|name| name.starts_with(PENDING_PREFIX)) {
            requester = Some(event.identity());
            break;
        }
        responders.insert(event.identity());
    }

    if let Some(requester) = requester {
        responders.remove(&requester);
    }
    !responders.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(name: &str, actor: &str) -> TimelineEvent {
        TimelineEvent::Labeled {
            label_name: name.into(),
            actor: Some(actor.into()),
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        }
    }

    fn comment(author: &str) -> TimelineEvent {
        TimelineEvent::Comment { author: Some(author.into()) }
    }

    #[test]
    fn empty_timeline_is_not_responded() {
        assert!(!was_responded_to_after_flagging(&[]));
    }

    #[test]
    fn flag_without_followup_is_not_responded() {
        let events = vec![comment("reporter"), labeled("pending:reproducer", "maintainer")];
        assert!(!was_responded_to_after_flagging(&events));
    }

    #[test]
    fn requester_activity_alone_is_not_a_response() {
        let events = vec![
            labeled("pending:feedback", "maintainer"),
            comment("maintainer"),
            TimelineEvent::RenamedTitle { actor: Some("maintainer".into()) },
            labeled("in:core", "maintainer"),
        ];
        assert!(!was_responded_to_after_flagging(&events));
    }

    #[test]
    fn third_party_comment_is_a_response() {
        let events = vec![labeled("pending:dco", "maintainer"), comment("contributor")];
        assert!(was_responded_to_after_flagging(&events));
    }

    #[test]
    fn commit_by_pull_request_author_is_a_response() {
        let events = vec![
            labeled("pending:feedback", "maintainer"),
            TimelineEvent::Commit { author: Some("contributor".into()) },
        ];
        assert!(was_responded_to_after_flagging(&events));
    }

    #[test]
    fn only_the_latest_flag_matters() {
        let events = vec![
            labeled("pending:feedback", "maintainer"),
            comment("contributor"),
            labeled("pending:feedback", "other-maintainer"),
        ];
        assert!(!was_responded_to_after_flagging(&events));
    }

    #[test]
    fn another_maintainer_commenting_counts() {
        let events = vec![labeled("pending:feedback", "maintainer"), comment("other-maintainer")];
        assert!(was_responded_to_after_flagging(&events));
    }

    #[test]
    fn unflagged_history_counts_as_responded() {
        let events = vec![comment("reporter")];
        assert!(was_responded_to_after_flagging(&events));

        let only_labels = vec![labeled("a:bug", "maintainer")];
        assert!(was_responded_to_after_flagging(&only_labels));
    }

    #[test]
    fn deleted_account_counts_as_someone_else() {
        let events =
            vec![labeled("pending:feedback", "maintainer"), TimelineEvent::Comment { author: None }];
        assert!(was_responded_to_after_flagging(&events));
    }
}
