//! Install command: the batch loop over the app manifest.
//!
//! One app failing never stops the batch. Every outcome is collected and
//! reported at the end.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use droidrepo_core::RepositoryRegistry;
use droidrepo_schema::{AppId, Arch};
use tracing::{info, warn};

use crate::Settings;
use crate::device::{AdbDevice, Device};
use crate::manifest::{self, AppSpec};

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed(PathBuf),
    AlreadyInstalled,
    /// The entry's source is not one we handle.
    UnsupportedSource(String),
    /// The repository has no build of the app for this device.
    Unavailable(String),
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed(path) => write!(f, "installed from {}", path.display()),
            Self::AlreadyInstalled => f.write_str("already installed"),
            Self::UnsupportedSource(source) => write!(f, "skipped: unsupported source '{source}'"),
            Self::Unavailable(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub outcomes: Vec<(AppId, Outcome)>,
}

impl InstallReport {
    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(|o| matches!(o, Outcome::Failed(_))) > 0
    }
}

/// Install every app in the manifest at `manifest_path` onto an adb device.
pub async fn install(manifest_path: &Path, serial: Option<&str>, settings: &Settings) -> Result<()> {
    let apps = manifest::load(manifest_path)?;
    let device = AdbDevice::connect(serial).await?;
    info!("Using device {}", device.serial());

    let mut registry = RepositoryRegistry::new(super::http_client()?, &settings.repos_dir)
        .with_preference(settings.preference);

    let report = install_all(&device, &apps, &mut registry, &settings.apks_dir).await?;

    for (app_id, outcome) in &report.outcomes {
        println!("  {:<40} {outcome}", app_id.as_str());
    }
    println!();
    println!(
        "  {} installed, {} already present, {} skipped, {} failed",
        report.count(|o| matches!(o, Outcome::Installed(_))),
        report.count(|o| matches!(o, Outcome::AlreadyInstalled)),
        report.count(|o| matches!(o, Outcome::UnsupportedSource(_) | Outcome::Unavailable(_))),
        report.count(|o| matches!(o, Outcome::Failed(_))),
    );

    if report.has_failures() {
        anyhow::bail!("Some apps could not be installed");
    }
    Ok(())
}

/// Run the manifest against `device`.
///
/// Only a failure to read the device's architecture aborts the batch.
pub async fn install_all<D: Device>(
    device: &D,
    apps: &[AppSpec],
    registry: &mut RepositoryRegistry,
    apks_dir: &Path,
) -> Result<InstallReport> {
    let arch = device.arch().await?;
    if arch == Arch::Unknown {
        warn!("Device reports no supported ABI; F-Droid apps will be skipped");
    } else {
        info!("Device architecture: {arch}");
    }

    let mut report = InstallReport::default();
    for app in apps {
        let outcome = install_one(device, app, arch, registry, apks_dir).await;
        match &outcome {
            Outcome::Failed(reason) => warn!("{}: {reason}", app.app_id),
            Outcome::Unavailable(reason) => warn!("{reason}"),
            _ => info!("{}: {outcome}", app.app_id),
        }
        report.outcomes.push((app.app_id.clone(), outcome));
    }
    Ok(report)
}

async fn install_one<D: Device>(
    device: &D,
    app: &AppSpec,
    arch: Arch,
    registry: &mut RepositoryRegistry,
    apks_dir: &Path,
) -> Outcome {
    if !app.is_fdroid() {
        return Outcome::UnsupportedSource(app.source.clone());
    }

    match device.is_installed(&app.app_id).await {
        Ok(true) => return Outcome::AlreadyInstalled,
        Ok(false) => {}
        Err(e) => return Outcome::Failed(format!("{e:#}")),
    }

    info!("Installing {}", app.app_id);
    let repo = match registry.get_or_create(app.repo_url()).await {
        Ok(repo) => repo,
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let apk = match repo.resolve_and_download(&app.app_id, arch, apks_dir).await {
        Ok(apk) => apk,
        Err(e) if e.is_recoverable() => return Outcome::Unavailable(e.to_string()),
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    match device.install(&apk).await {
        Ok(()) => Outcome::Installed(apk),
        Err(e) => Outcome::Failed(format!("{e:#}")),
    }
}
