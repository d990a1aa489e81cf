//! Repository identity by second-level domain.
//!
//! `https://f-droid.org/repo` and `https://f-droid.org/archive` are the same
//! repository host, so the registry keys them both as `f-droid.org`.
//!
//! The rule is "last two host labels". Multi-part public suffixes are not
//! understood: `https://apps.example.co.uk/repo` normalises to `co.uk`.

use reqwest::Url;

use crate::error::RepoError;

/// Derive the deduplication key for a repository URL.
///
/// The key is the last two dot-separated labels of the URL's host. Scheme,
/// port, credentials and path are ignored.
///
/// # Errors
///
/// Returns [`RepoError::InvalidUrl`] if the URL does not parse, has no host,
/// or the host has fewer than two labels.
///
/// # Example
///
/// ```
/// use droidrepo_core::domain::normalize;
///
/// assert_eq!(normalize("https://f-droid.org/repo").unwrap(), "f-droid.org");
/// assert_eq!(normalize("https://apt.izzysoft.de/fdroid/repo").unwrap(), "izzysoft.de");
/// assert!(normalize("http://localhost/repo").is_err());
/// ```
pub fn normalize(url: &str) -> Result<String, RepoError> {
    let invalid = |reason: &str| RepoError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    let host = parsed.host_str().ok_or_else(|| invalid("no host"))?;

    let labels: Vec<&str> = host.split('.').collect();
    let [.., second, top] = labels.as_slice() else {
        return Err(invalid("host has fewer than two labels"));
    };
    if second.is_empty() || top.is_empty() {
        return Err(invalid("host has an empty label"));
    }

    Ok(format!("{second}.{top}"))
}

/// A repository URL together with its normalised domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    url: String,
    domain: String,
}

impl RepositoryIdentity {
    /// Build an identity, dropping any trailing `/` from the URL so that
    /// request paths can be appended directly.
    ///
    /// # Errors
    ///
    /// See [`normalize`].
    pub fn new(url: &str) -> Result<Self, RepoError> {
        let url = url.trim_end_matches('/').to_string();
        let domain = normalize(&url)?;
        Ok(Self { url, domain })
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deduplication key, e.g. `f-droid.org`.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `true` if both identities point at the same repository host.
    pub fn same_repository(&self, other: &Self) -> bool {
        self.domain == other.domain
    }
}

impl std::fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
