//! Single-shot GET helpers.
//!
//! One request per call, no retries. Non-2xx statuses are fetch failures.

use std::path::Path;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::{ParseError, RepoError};

/// Fetch `url` and return the whole body.
pub async fn get_bytes(client: &Client, url: &str) -> Result<Bytes, RepoError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| RepoError::fetch(url, e))?;

    response.bytes().await.map_err(|e| RepoError::fetch(url, e))
}

/// Fetch `url` and deserialize it as JSON.
///
/// `repo` and `what` only label the error.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    repo: &str,
    what: &'static str,
) -> Result<T, RepoError> {
    let body = get_bytes(client, url).await?;
    serde_json::from_slice(&body)
        .map_err(|source| RepoError::parse(repo, ParseError::Json { what, source }))
}

/// Stream `url` into `dest`.
///
/// The body lands in a temporary file next to `dest` and is renamed into
/// place only once complete.
pub async fn download_to(client: &Client, url: &str, dest: &Path) -> Result<u64, RepoError> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| RepoError::fetch(url, e))?;

    let tmp = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(dir)
        .map_err(|e| RepoError::io(dir, e))?;
    let std_file = tmp.as_file().try_clone().map_err(|e| RepoError::io(tmp.path(), e))?;
    let mut file = tokio::fs::File::from_std(std_file);

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RepoError::fetch(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| RepoError::io(tmp.path(), e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| RepoError::io(tmp.path(), e))?;
    drop(file);

    tmp.persist(dest).map_err(|e| RepoError::io(dest, e.error))?;
    Ok(written)
}

/// Write `data` to `dest` through a temporary sibling file.
pub fn write_atomic(dest: &Path, data: &[u8]) -> Result<(), RepoError> {
    use std::io::Write;

    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".index-")
        .tempfile_in(dir)
        .map_err(|e| RepoError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| RepoError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| RepoError::io(tmp.path(), e))?;
    tmp.persist(dest).map_err(|e| RepoError::io(dest, e.error))?;
    Ok(())
}
