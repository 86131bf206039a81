//! Cassette data structures.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call to a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`tracker`, `pages` or `clock`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// Returned value; fallible calls use `{"ok": ...}` or `{"err": "..."}`.
    pub output: serde_json::Value,
}

/// A recorded session against one repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Repository (`owner/name`) the session ran against.
    pub repo: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_reads_written_yaml() {
        let dir = std::env::temp_dir().join("triage_cassette_format_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pages.cassette.yaml");

        let cassette = Cassette {
            name: "pages".into(),
            recorded_at: Utc::now(),
            repo: "gradle/gradle".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: "pages".into(),
                method: "fetch".into(),
                input: json!({"url": "https://github.com/gradle/gradle/issues/1"}),
                output: json!({"ok": {"status": 200, "body": "<html></html>"}}),
            }],
        };
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let loaded = Cassette::load(&path).unwrap();
        assert_eq!(loaded, cassette);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Cassette::load(Path::new("/nonexistent/triage.cassette.yaml")).unwrap_err();
        assert!(err.contains("Failed to read cassette file"));
    }
}
