//! Fetch command

use anyhow::Result;
use droidrepo_core::RepositoryRegistry;
use droidrepo_schema::Arch;

use crate::Settings;

/// Resolve `app_id` for `arch` in `repo` and download it, printing the path.
pub async fn fetch(app_id: &str, repo: &str, arch: Arch, settings: &Settings) -> Result<()> {
    let mut registry = RepositoryRegistry::new(super::http_client()?, &settings.repos_dir)
        .with_preference(settings.preference);

    let repository = registry.get_or_create(repo).await?;
    let path = repository
        .resolve_and_download(app_id, arch, &settings.apks_dir)
        .await?;

    println!("{}", path.display());
    Ok(())
}
