//! In-memory view of a parsed index document.

use droidrepo_schema::{AppEntry, AppId};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{ParseError, RepoError};

#[derive(Deserialize)]
struct RawIndex {
    #[serde(default)]
    packages: Option<IndexMap<AppId, Box<RawValue>>>,
}

/// Application catalog of one repository.
///
/// Only the top-level `packages` mapping is validated up front. Each
/// application's entry is kept as raw JSON and decoded into a typed
/// [`AppEntry`] on lookup, so one malformed application cannot take the
/// rest of the repository down with it.
#[derive(Debug)]
pub struct Catalog {
    origin: String,
    packages: IndexMap<AppId, Box<RawValue>>,
}

impl Catalog {
    /// Parse index bytes served by `origin` (used only to label errors).
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Parse`] if the bytes are not JSON or the
    /// `packages` key is absent or not a mapping.
    pub fn parse(origin: &str, bytes: &[u8]) -> Result<Self, RepoError> {
        let raw: RawIndex = serde_json::from_slice(bytes).map_err(|source| {
            RepoError::parse(
                origin,
                ParseError::Json {
                    what: "index",
                    source,
                },
            )
        })?;

        let packages = raw
            .packages
            .ok_or_else(|| RepoError::parse(origin, ParseError::MissingPackages))?;

        Ok(Self {
            origin: origin.to_string(),
            packages,
        })
    }

    /// The repository this catalog came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.packages.contains_key(app_id)
    }

    /// Application ids in document order.
    pub fn app_ids(&self) -> impl Iterator<Item = &AppId> {
        self.packages.keys()
    }

    /// Decode the entry for `app_id`.
    ///
    /// Returns `Ok(None)` if the application is not listed.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Parse`] if the entry exists but lacks a field we
    /// need or has one of the wrong type.
    pub fn app(&self, app_id: &str) -> Result<Option<AppEntry>, RepoError> {
        let Some(raw) = self.packages.get(app_id) else {
            return Ok(None);
        };

        serde_json::from_str(raw.get()).map(Some).map_err(|source| {
            RepoError::parse(
                &self.origin,
                ParseError::Entry {
                    app_id: AppId::new(app_id),
                    source,
                },
            )
        })
    }
}
