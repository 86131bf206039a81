//! Runtime settings read from the environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TriageError;

/// Default GitHub REST/GraphQL API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default root for public issue pages.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// A repository reference in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Creates a reference from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }
}

impl FromStr for RepoRef {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(TriageError::Settings(format!(
                "repository must be given as owner/name, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Repository being triaged.
    pub repo: RepoRef,
    /// API token; only tracker calls need it.
    pub token: Option<String>,
    /// API root for GraphQL and REST calls.
    pub api_url: String,
    /// Root for public issue pages.
    pub web_url: String,
    /// When set, port interactions are recorded to cassettes in this directory.
    pub record_dir: Option<PathBuf>,
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// `repo` overrides `GITHUB_REPOSITORY`. Other variables: `GITHUB_TOKEN`,
    /// `GITHUB_API_URL`, `GITHUB_SERVER_URL`, `TRIAGE_RECORD`.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Settings`] if no repository is given or it is malformed.
    pub fn from_env(repo: Option<&str>) -> Result<Self, TriageError> {
        let repo = match repo {
            Some(repo) => repo.to_string(),
            None => env::var("GITHUB_REPOSITORY").map_err(|_| {
                TriageError::Settings(
                    "no repository given; pass --repo or set GITHUB_REPOSITORY".into(),
                )
            })?,
        };

        Ok(Self {
            repo: repo.parse()?,
            token: non_empty_var("GITHUB_TOKEN"),
            api_url: non_empty_var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            web_url: non_empty_var("GITHUB_SERVER_URL").unwrap_or_else(|| DEFAULT_WEB_URL.into()),
            record_dir: non_empty_var("TRIAGE_RECORD").map(PathBuf::from),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let repo: RepoRef = "gradle/gradle".parse().unwrap();
        assert_eq!(repo, RepoRef::new("gradle", "gradle"));
        assert_eq!(repo.to_string(), "gradle/gradle");
    }

    #[test]
    fn rejects_malformed_repositories() {
        for bad in ["gradle", "/gradle", "gradle/", "a/b/c", ""] {
            let err = bad.parse::<RepoRef>().unwrap_err();
            assert!(err.to_string().contains("owner/name"), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn explicit_repo_wins() {
        let settings = Settings::from_env(Some("octo/widgets")).unwrap();
        assert_eq!(settings.repo, RepoRef::new("octo", "widgets"));
    }
}
