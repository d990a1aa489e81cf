//! droidrepo - provision Android devices from F-Droid repositories
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Reads an app manifest, checks what the connected device already has, and
//! installs the rest from the repositories the manifest names.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.droidrepo/
//! ├── repos/      # Cached repository indexes, one directory per domain
//! └── apks/       # Downloaded artifacts
//! ```

pub mod cmd;
pub mod device;
pub mod manifest;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use droidrepo_core::Preference;
use droidrepo_schema::Arch;

/// Repository used when a manifest entry or `fetch` names none.
pub const DEFAULT_REPO: &str = "https://f-droid.org/repo";

#[derive(Debug, Parser)]
#[command(name = "droidrepo")]
#[command(author, version, about = "droidrepo - provision Android devices from F-Droid repositories")]
pub struct Cli {
    /// Where repository indexes are cached
    #[arg(long, global = true, env = "DROIDREPO_REPOS_DIR")]
    pub repos_dir: Option<PathBuf>,

    /// Where downloaded APKs are kept
    #[arg(long, global = true, env = "DROIDREPO_APKS_DIR")]
    pub apks_dir: Option<PathBuf>,

    /// Pick the compatible build with the highest versionCode instead of the
    /// first one the index lists
    #[arg(long, global = true)]
    pub prefer_highest_version_code: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install every app in a manifest onto a connected device
    Install {
        /// App manifest (YAML list of `source`, `app-id`, `repo`)
        #[arg(default_value = "apps.yml")]
        manifest: PathBuf,
        /// Device serial, when more than one is attached
        #[arg(long, short, env = "ANDROID_SERIAL")]
        serial: Option<String>,
    },
    /// Resolve and download one app without a device
    Fetch {
        /// Application id, e.g. org.fdroid.fdroid
        app_id: String,
        /// Repository URL
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
        /// Target ABI, e.g. arm64-v8a or armeabi-v7a
        #[arg(long, default_value = "arm64-v8a")]
        arch: Arch,
    },
}

/// Directories and policy resolved from flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub repos_dir: PathBuf,
    pub apks_dir: PathBuf,
    pub preference: Preference,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let repos_dir = match &cli.repos_dir {
            Some(dir) => dir.clone(),
            None => droidrepo_core::paths::repos_path().context(HOME_HINT)?,
        };
        let apks_dir = match &cli.apks_dir {
            Some(dir) => dir.clone(),
            None => droidrepo_core::paths::apks_path().context(HOME_HINT)?,
        };
        let preference = if cli.prefer_highest_version_code {
            Preference::HighestVersionCode
        } else {
            Preference::IndexOrder
        };

        Ok(Self {
            repos_dir,
            apks_dir,
            preference,
        })
    }
}

const HOME_HINT: &str = "Could not determine home directory. Set DROIDREPO_HOME to override.";
