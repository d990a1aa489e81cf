pub mod fetch;
pub mod install;

/// Shared HTTP client for all repositories in one run.
pub(crate) fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(droidrepo_core::USER_AGENT)
        .build()?)
}
