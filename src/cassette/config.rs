//! Per-port cassette selection for replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette file paths. Ports without a path are left unconfigured
/// and panic if called during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the clock port.
    pub clock: Option<PathBuf>,
    /// Cassette for the issue tracker port.
    pub tracker: Option<PathBuf>,
    /// Cassette for the page fetcher port.
    pub pages: Option<PathBuf>,
}

/// Replayers loaded from a [`CassetteConfig`].
pub struct PortReplayers {
    /// Replayer for the clock port.
    pub clock: Option<CassetteReplayer>,
    /// Replayer for the issue tracker port.
    pub tracker: Option<CassetteReplayer>,
    /// Replayer for the page fetcher port.
    pub pages: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Points every port at the files a [`RecordingSession`] writes into `dir`,
    /// skipping files that do not exist.
    ///
    /// [`RecordingSession`]: super::session::RecordingSession
    #[must_use]
    pub fn from_session_dir(dir: &Path) -> Self {
        let existing = |port: &str| {
            let path = dir.join(format!("{port}.cassette.yaml"));
            path.exists().then_some(path)
        };
        Self { clock: existing("clock"), tracker: existing("tracker"), pages: existing("pages") }
    }

    /// Loads every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: &Option<PathBuf>| -> Result<Option<CassetteReplayer>, String> {
            path.as_deref().map(|p| Cassette::load(p).map(|c| CassetteReplayer::new(&c))).transpose()
        };
        Ok(PortReplayers {
            clock: load(&self.clock)?,
            tracker: load(&self.tracker)?,
            pages: load(&self.pages)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use serde_json::json;

    #[test]
    fn from_session_dir_skips_missing_ports() {
        let dir = std::env::temp_dir().join("triage_cassette_config_dir");
        std::fs::create_dir_all(&dir).unwrap();
        let mut clock = CassetteRecorder::new(dir.join("clock.cassette.yaml"), "clock", "o/r");
        clock.record("clock", "now", json!(null), json!("2024-01-01T00:00:00Z"));
        clock.finish().unwrap();

        let config = CassetteConfig::from_session_dir(&dir);
        assert!(config.clock.is_some());
        assert!(config.tracker.is_none());
        assert!(config.pages.is_none());

        let mut replayers = config.load_all().unwrap();
        let now = replayers.clock.as_mut().unwrap().next_interaction("clock", "now");
        assert_eq!(now.output, json!("2024-01-01T00:00:00Z"));
        assert!(replayers.tracker.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_all_fails_on_unreadable_cassette() {
        let config = CassetteConfig {
            tracker: Some(PathBuf::from("/nonexistent/tracker.cassette.yaml")),
            ..CassetteConfig::default()
        };
        assert!(config.load_all().is_err());
    }
}
