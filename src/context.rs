//! Service context bundling all port trait objects.

use std::path::Path;

use crate::adapters::live::{LiveClock, LiveGitHub, LivePageFetcher};
use crate::adapters::recording::{RecordingClock, RecordingIssueTracker, RecordingPageFetcher};
use crate::adapters::replaying::{ReplayingClock, ReplayingIssueTracker, ReplayingPageFetcher};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Settings;
use crate::error::TriageError;
use crate::model::{ClosedLabelIndex, FeedbackableItem, IssueDetails, ItemKind, PullRequestFiles};
use crate::ports::{Clock, IssueEdit, IssueTracker, Mutation, Page, PageFetcher, PortFuture};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// Issue tracker for queries and mutations.
    pub tracker: Box<dyn IssueTracker>,
    /// Fetcher for public web pages.
    pub pages: Box<dyn PageFetcher>,
}

impl ServiceContext {
    /// Creates a live context talking to GitHub.
    #[must_use]
    pub fn live(settings: &Settings) -> Self {
        Self {
            clock: Box::new(LiveClock),
            tracker: Box::new(LiveGitHub::new(settings)),
            pages: Box::new(LivePageFetcher::new()),
        }
    }

    /// Creates a live context whose calls are recorded below `root`.
    ///
    /// Drop the context before calling [`RecordingSession::finish`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created.
    pub fn recording_at(settings: &Settings, root: &Path) -> Result<(Self, RecordingSession), TriageError> {
        let session =
            RecordingSession::new(root, &settings.repo.to_string()).map_err(TriageError::Cassette)?;
        let live = Self::live(settings);
        let ctx = Self {
            clock: Box::new(RecordingClock::new(live.clock, session.clock.clone())),
            tracker: Box::new(RecordingIssueTracker::new(live.tracker, session.tracker.clone())),
            pages: Box::new(RecordingPageFetcher::new(live.pages, session.pages.clone())),
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own cursor over the same cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, TriageError> {
        let cassette = Cassette::load(path).map_err(TriageError::Cassette)?;
        Ok(Self {
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            tracker: Box::new(ReplayingIssueTracker::new(CassetteReplayer::new(&cassette))),
            pages: Box::new(ReplayingPageFetcher::new(CassetteReplayer::new(&cassette))),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette file use a panicking adapter
    /// that fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, TriageError> {
        let replayers = config.load_all().map_err(TriageError::Cassette)?;

        Ok(Self {
            clock: match replayers.clock {
                Some(r) => Box::new(ReplayingClock::new(r)),
                None => Box::new(PanickingClock),
            },
            tracker: match replayers.tracker {
                Some(r) => Box::new(ReplayingIssueTracker::new(r)),
                None => Box::new(PanickingIssueTracker),
            },
            pages: match replayers.pages {
                Some(r) => Box::new(ReplayingPageFetcher::new(r)),
                None => Box::new(PanickingPageFetcher),
            },
        })
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingClock;
impl Clock for PanickingClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        panic!("Clock port not configured in CassetteConfig: no cassette loaded for clock");
    }
}

struct PanickingPageFetcher;
impl PageFetcher for PanickingPageFetcher {
    fn fetch(&self, url: &str) -> PortFuture<'_, Page> {
        panic!("PageFetcher port not configured in CassetteConfig: cannot fetch {url}");
    }
}

struct PanickingIssueTracker;

impl PanickingIssueTracker {
    fn unconfigured(method: &str) -> ! {
        panic!("IssueTracker port not configured in CassetteConfig: cannot call {method}");
    }
}

impl IssueTracker for PanickingIssueTracker {
    fn feedback_items(&self, _kind: ItemKind, _labels: &[&str]) -> PortFuture<'_, Vec<FeedbackableItem>> {
        Self::unconfigured("feedback_items")
    }
    fn closed_labels(&self, _query: &str) -> PortFuture<'_, ClosedLabelIndex> {
        Self::unconfigured("closed_labels")
    }
    fn mutate(&self, _item_id: &str, _mutations: &[Mutation]) -> PortFuture<'_, ()> {
        Self::unconfigured("mutate")
    }
    fn issue(&self, _number: u64) -> PortFuture<'_, IssueDetails> {
        Self::unconfigured("issue")
    }
    fn pull_request_files(&self, _numbers: &[u64]) -> PortFuture<'_, Vec<PullRequestFiles>> {
        Self::unconfigured("pull_request_files")
    }
    fn edit_issue(&self, _number: u64, _edits: &[IssueEdit]) -> PortFuture<'_, ()> {
        Self::unconfigured("edit_issue")
    }
}
