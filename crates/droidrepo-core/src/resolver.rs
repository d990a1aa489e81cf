//! Pick the version of an application to download for a device.

use droidrepo_schema::{AppId, Arch, VersionEntry};

use crate::catalog::Catalog;
use crate::error::RepoError;

/// How to choose among several compatible versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preference {
    /// First compatible version in the order the index lists them. The
    /// repository's ordering is taken as its preference.
    #[default]
    IndexOrder,
    /// Compatible version with the highest Android `versionCode`; ties and
    /// missing codes fall back to index order.
    HighestVersionCode,
}

/// A version chosen by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub app_id: AppId,
    /// Key of the version inside the application's `versions` mapping.
    pub key: String,
    pub entry: VersionEntry,
}

impl ResolvedVersion {
    /// Human readable label for logs, e.g. `1.19.1 (1019050)`.
    pub fn label(&self) -> String {
        let manifest = &self.entry.manifest;
        match (&manifest.version_name, manifest.version_code) {
            (Some(name), Some(code)) => format!("{name} ({code})"),
            (Some(name), None) => name.clone(),
            (None, Some(code)) => code.to_string(),
            (None, None) => self.key.clone(),
        }
    }
}

/// Select the version of `app_id` to install on an `arch` device.
///
/// A version is compatible when its `nativecode` is absent or contains the
/// architecture's repository tag.
///
/// # Errors
///
/// - [`RepoError::AppNotFound`] if the catalog does not list `app_id`.
/// - [`RepoError::UnsupportedArchitecture`] if `arch` has no repository tag.
/// - [`RepoError::NoCompatibleVersion`] if no version matches the tag.
/// - [`RepoError::Parse`] if the application's entry is malformed.
pub fn resolve(
    catalog: &Catalog,
    app_id: &str,
    arch: Arch,
    preference: Preference,
) -> Result<ResolvedVersion, RepoError> {
    let repo = catalog.origin();
    let app = catalog.app(app_id)?.ok_or_else(|| RepoError::AppNotFound {
        app_id: AppId::new(app_id),
        repo: repo.to_string(),
    })?;

    let tag = arch
        .native_tag()
        .ok_or_else(|| RepoError::UnsupportedArchitecture {
            app_id: AppId::new(app_id),
            arch,
            repo: repo.to_string(),
        })?;

    let mut compatible = app.versions.into_iter().filter(|(_, v)| v.supports(tag));

    let chosen = match preference {
        Preference::IndexOrder => compatible.next(),
        // `max_by_key` keeps the last maximum; reversing keeps the first.
        Preference::HighestVersionCode => compatible
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .max_by_key(|(_, v)| v.manifest.version_code),
    };

    let (key, entry) = chosen.ok_or_else(|| RepoError::NoCompatibleVersion {
        app_id: AppId::new(app_id),
        arch,
        repo: repo.to_string(),
    })?;

    Ok(ResolvedVersion {
        app_id: AppId::new(app_id),
        key,
        entry,
    })
}
