//! Error types shared across the triage core.

use thiserror::Error;

use crate::ports::PortError;

/// Errors surfaced by the triage core.
#[derive(Debug, Error)]
pub enum TriageError {
    /// A public page could not be fetched with a success status.
    #[error("Failed to fetch {url}: HTTP {status}")]
    Fetch {
        /// The requested page URL.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// Expected markup was absent from a fetched page.
    #[error("No container for linked PRs found in {url}; the extraction selector needs updating")]
    Parse {
        /// The page URL whose markup did not match.
        url: String,
    },

    /// A feedback rule references a close label missing from the closed-label index.
    #[error("Close label {label:?} for rule {trigger:?} does not exist in the repository")]
    Config {
        /// The trigger label of the offending rule.
        trigger: String,
        /// The missing close label.
        label: String,
    },

    /// A mutation on a single item failed.
    #[error("Mutation on #{number} failed: {source}")]
    RemoteMutation {
        /// The item number the mutation targeted.
        number: u64,
        /// The underlying port error.
        #[source]
        source: PortError,
    },

    /// A read or transport call to an external collaborator failed.
    #[error("{context}: {source}")]
    Remote {
        /// What the core was doing when the call failed.
        context: String,
        /// The underlying port error.
        #[source]
        source: PortError,
    },

    /// Runtime settings are missing or malformed.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// A cassette could not be read, parsed or written.
    #[error("Cassette error: {0}")]
    Cassette(String),
}

impl TriageError {
    /// Wraps a port error with a description of the failed call.
    pub fn remote(context: impl Into<String>, source: PortError) -> Self {
        Self::Remote { context: context.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_mentions_status_and_url() {
        let err = TriageError::Fetch { url: "https://github.com/o/r/issues/1".into(), status: 404 };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("issues/1"));
    }

    #[test]
    fn remote_mutation_keeps_source() {
        let err = TriageError::RemoteMutation { number: 7, source: "boom".into() };
        assert_eq!(err.to_string(), "Mutation on #7 failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }
}
