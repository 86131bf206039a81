//! Recording session: one cassette recorder per port.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Shared handle to a port's recorder.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Owns the per-port recorders of a run that is being recorded.
///
/// Cassettes land in a timestamped directory below the requested root, one
/// `<port>.cassette.yaml` per port.
pub struct RecordingSession {
    /// Recorder for clock interactions.
    pub clock: SharedRecorder,
    /// Recorder for issue tracker interactions.
    pub tracker: SharedRecorder,
    /// Recorder for page fetcher interactions.
    pub pages: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Creates the session directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(root: impl Into<PathBuf>, repo: &str) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.into().join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let make_recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("{timestamp}-{port}"), repo)))
        };

        Ok(Self {
            clock: make_recorder("clock"),
            tracker: make_recorder("tracker"),
            pages: make_recorder("pages"),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Writes every port's cassette.
    ///
    /// The recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorder is still shared or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(recorder: SharedRecorder, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(recorder)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.clock, "clock")?;
        finish_one(self.tracker, "tracker")?;
        finish_one(self.pages, "pages")?;
        Ok(self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_writes_one_cassette_per_port() {
        let root = std::env::temp_dir().join("triage_session_test");
        let session = RecordingSession::new(&root, "octo/widgets").unwrap();
        assert!(session.output_dir().exists());

        let dir = session.finish().unwrap();
        for port in ["clock", "tracker", "pages"] {
            assert!(dir.join(format!("{port}.cassette.yaml")).exists(), "{port} cassette missing");
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn finish_fails_while_recorder_is_shared() {
        let root = std::env::temp_dir().join("triage_session_shared_test");
        let session = RecordingSession::new(&root, "octo/widgets").unwrap();
        let _held = Arc::clone(&session.tracker);

        let err = session.finish().unwrap_err();
        assert!(err.contains("still has references"));

        let _ = std::fs::remove_dir_all(&root);
    }
}
