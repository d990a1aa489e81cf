//! Wire format of an F-Droid style repository.
//!
//! Two documents are consumed:
//!
//! - `entry.json`, the [`EntryDescriptor`], naming the current index file and
//!   its SHA256.
//! - the index itself (usually `/index-v2.json`), whose `packages` mapping
//!   holds one [`AppEntry`] per application.
//!
//! Only the fields we act on are modelled; everything else in the documents
//! is ignored by serde.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::hash::Sha256Digest;

/// Contents of `{repo}/entry.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    /// The current index file.
    pub index: IndexFileRef,
}

impl EntryDescriptor {
    /// Path of the index relative to the repository URL, e.g. `/index-v2.json`.
    pub fn index_file_name(&self) -> &str {
        &self.index.name
    }

    /// Expected SHA256 of the index file's bytes.
    pub fn index_sha256(&self) -> &Sha256Digest {
        &self.index.sha256
    }
}

/// Reference to the index file inside an [`EntryDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFileRef {
    /// Path of the index, expected to begin with `/`.
    pub name: String,
    /// SHA256 of the index bytes.
    pub sha256: Sha256Digest,
    /// Size in bytes, when advertised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One application in the index.
///
/// `versions` keeps the document's key order: resolution walks it front to
/// back and takes the first compatible build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Version key (usually the APK's hash) to version entry.
    pub versions: IndexMap<String, VersionEntry>,
}

/// One downloadable build of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// The artifact for this build.
    pub file: FileEntry,
    /// Android manifest summary.
    #[serde(default)]
    pub manifest: VersionManifest,
}

impl VersionEntry {
    /// Artifact path relative to the repository URL, e.g. `/org.example_12.apk`.
    pub fn artifact_path(&self) -> &str {
        &self.file.name
    }

    /// Architecture tags this build is restricted to, or `None` if it runs
    /// anywhere.
    pub fn nativecode(&self) -> Option<&[String]> {
        self.manifest.nativecode.as_deref()
    }

    /// Whether this build can be installed on a device with the given
    /// repository architecture tag.
    pub fn supports(&self, tag: &str) -> bool {
        self.nativecode()
            .is_none_or(|tags| tags.iter().any(|t| t == tag))
    }
}

/// Artifact reference inside a [`VersionEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the artifact relative to the repository URL.
    pub name: String,
    /// SHA256 of the artifact, when advertised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Size in bytes, when advertised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Subset of the Android manifest recorded in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    /// Human readable version, e.g. `1.19.1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    /// Monotonic Android version code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<u64>,
    /// Native ABIs the build contains; absent or `null` means architecture-agnostic.
    #[serde(default)]
    pub nativecode: Option<Vec<String>>,
}
