//! The device being provisioned.
//!
//! Device access is a collaborator: the install loop only needs to know the
//! device's ABIs, whether an app is present, and how to install an APK.
//! [`AdbDevice`] provides that over the `adb` command-line tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use droidrepo_schema::Arch;
use tokio::process::Command;
use tracing::debug;

#[async_trait]
pub trait Device: Send + Sync {
    /// Raw `ro.product.cpu.abilist`, e.g. `arm64-v8a,armeabi-v7a,armeabi`.
    async fn abi_list(&self) -> Result<String>;

    async fn is_installed(&self, app_id: &str) -> Result<bool>;

    async fn install(&self, apk: &Path) -> Result<()>;

    /// Architecture to resolve builds for.
    async fn arch(&self) -> Result<Arch> {
        Ok(Arch::from_abi_list(&self.abi_list().await?))
    }
}

/// A device reached through `adb`.
#[derive(Debug, Clone)]
pub struct AdbDevice {
    adb: PathBuf,
    serial: String,
}

impl AdbDevice {
    /// Find `adb` on `PATH` and pick the device with `serial`, or the first
    /// attached device when no serial is given.
    pub async fn connect(serial: Option<&str>) -> Result<Self> {
        let adb = which::which("adb").context("adb not found on PATH")?;

        let output = run(Command::new(&adb).arg("devices")).await?;
        let devices = parse_devices(&output);
        debug!("adb devices: {devices:?}");

        let serial = match serial {
            Some(wanted) if devices.iter().any(|d| d == wanted) => wanted.to_string(),
            Some(wanted) => bail!("Device {wanted} is not attached"),
            None => devices
                .into_iter()
                .next()
                .context("No devices available")?,
        };

        Ok(Self { adb, serial })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb);
        cmd.arg("-s").arg(&self.serial);
        cmd
    }

    async fn shell(&self, args: &[&str]) -> Result<String> {
        run(self.command().arg("shell").args(args)).await
    }
}

#[async_trait]
impl Device for AdbDevice {
    async fn abi_list(&self) -> Result<String> {
        Ok(self
            .shell(&["getprop", "ro.product.cpu.abilist"])
            .await?
            .trim()
            .to_string())
    }

    async fn is_installed(&self, app_id: &str) -> Result<bool> {
        let output = self.shell(&["pm", "list", "packages", app_id]).await?;
        Ok(lists_package(&output, app_id))
    }

    async fn install(&self, apk: &Path) -> Result<()> {
        let output = run(self.command().arg("install").arg(apk)).await?;
        if output.contains("Success") {
            Ok(())
        } else {
            bail!("adb install {} failed: {}", apk.display(), output.trim())
        }
    }
}

async fn run(cmd: &mut Command) -> Result<String> {
    let output = cmd
        .output()
        .await
        .with_context(|| format!("Failed to run {cmd:?}"))?;
    if !output.status.success() {
        bail!(
            "{cmd:?} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Serials of attached devices in `adb devices` output, skipping
/// unauthorized and offline ones.
fn parse_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(serial), Some("device")) => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// `pm list packages <filter>` matches substrings, so look for the exact line.
fn lists_package(output: &str, app_id: &str) -> bool {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .any(|id| id == app_id)
}
