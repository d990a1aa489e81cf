//! Error taxonomy for repository operations.
//!
//! Construction-time failures (`InvalidUrl`, `Fetch`, `Parse`, `Io` while the
//! index loads) leave no repository behind. Resolution failures are scoped
//! to one application and the caller is expected to report them and move on.

use std::path::PathBuf;

use droidrepo_schema::{AppId, Arch};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse data from {repo}: {source}")]
    Parse {
        repo: String,
        #[source]
        source: ParseError,
    },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{app_id} not found in {repo}")]
    AppNotFound { app_id: AppId, repo: String },

    #[error("{app_id}: device architecture '{arch}' has no build tag in {repo}")]
    UnsupportedArchitecture {
        app_id: AppId,
        arch: Arch,
        repo: String,
    },

    #[error("{app_id} has no build for {arch} in {repo}")]
    NoCompatibleVersion {
        app_id: AppId,
        arch: Arch,
        repo: String,
    },
}

/// Why a document served by a repository could not be used.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("index has no `packages` mapping")]
    MissingPackages,

    #[error("invalid entry for {app_id}: {source}")]
    Entry {
        app_id: AppId,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsafe or empty path '{0}'")]
    InvalidPath(String),
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn parse(repo: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            repo: repo.into(),
            source,
        }
    }

    /// Per-application conditions a batch installer should report and skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AppNotFound { .. }
                | Self::UnsupportedArchitecture { .. }
                | Self::NoCompatibleVersion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resolution_errors_are_recoverable() {
        let not_found = RepoError::AppNotFound {
            app_id: AppId::new("org.example"),
            repo: "https://f-droid.org/repo".into(),
        };
        assert!(not_found.is_recoverable());

        let bad_url = RepoError::InvalidUrl {
            url: "localhost".into(),
            reason: "no domain".into(),
        };
        assert!(!bad_url.is_recoverable());

        let parse = RepoError::parse("https://f-droid.org/repo", ParseError::MissingPackages);
        assert!(!parse.is_recoverable());
    }

    #[test]
    fn messages_name_app_and_repository() {
        let err = RepoError::NoCompatibleVersion {
            app_id: AppId::new("org.example"),
            arch: Arch::ArmV8A,
            repo: "https://f-droid.org/repo".into(),
        };
        assert_eq!(
            err.to_string(),
            "org.example has no build for arm64-v8a in https://f-droid.org/repo"
        );
    }
}
