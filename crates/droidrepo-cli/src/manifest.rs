//! The app manifest: which apps to install and where they come from.
//!
//! ```yaml
//! - source: fdroid
//!   app-id: org.fdroid.fdroid
//!   repo: https://f-droid.org/repo
//! - source: fdroid
//!   app-id: com.termux
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use droidrepo_schema::AppId;
use serde::{Deserialize, Serialize};

/// Source name handled by this tool.
pub const FDROID_SOURCE: &str = "fdroid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppSpec {
    pub source: String,
    pub app_id: AppId,
    /// Repository URL; the main F-Droid repository when omitted.
    #[serde(default)]
    pub repo: Option<String>,
}

impl AppSpec {
    pub fn is_fdroid(&self) -> bool {
        self.source.eq_ignore_ascii_case(FDROID_SOURCE)
    }

    pub fn repo_url(&self) -> &str {
        self.repo.as_deref().unwrap_or(crate::DEFAULT_REPO)
    }
}

pub fn parse(yaml: &str) -> Result<Vec<AppSpec>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let apps: Option<Vec<AppSpec>> = serde_yaml::from_str(yaml).context("Invalid app manifest")?;
    Ok(apps.unwrap_or_default())
}

pub fn load(path: &Path) -> Result<Vec<AppSpec>> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    parse(&yaml).with_context(|| format!("Failed to load manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_in_order() {
        let apps = parse(
            "- source: fdroid\n  app-id: org.fdroid.fdroid\n  repo: https://f-droid.org/repo\n\
             - source: playstore\n  app-id: com.example.closed\n\
             - source: FDroid\n  app-id: com.termux\n",
        )
        .unwrap();

        assert_eq!(apps.len(), 3);
        assert_eq!(apps[0].app_id, "org.fdroid.fdroid");
        assert!(apps[0].is_fdroid());
        assert!(!apps[1].is_fdroid());
        assert!(apps[2].is_fdroid());
        assert_eq!(apps[2].repo_url(), crate::DEFAULT_REPO);
    }

    #[test]
    fn empty_manifest_is_empty() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn missing_app_id_is_an_error() {
        assert!(parse("- source: fdroid\n  repo: https://f-droid.org/repo\n").is_err());
    }

    #[test]
    fn load_reports_path() {
        let err = load(Path::new("/definitely/not/here/apps.yml")).unwrap_err();
        assert!(format!("{err:#}").contains("apps.yml"));
    }
}
