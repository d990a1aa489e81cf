use std::sync::Arc;

use droidrepo_core::{
    ParseError, RepoError, Repository, RepositoryRegistry, artifact, index_cache,
    resolver::Preference,
};
use droidrepo_schema::{Arch, Sha256Digest};
use mockito::{Mock, Server, ServerGuard};
use reqwest::Client;
use tempfile::TempDir;

const INDEX: &str = r#"{
    "repo": {"name": {"en-US": "Test Repo"}},
    "packages": {
        "org.example.notes": {
            "metadata": {"license": "GPL-3.0-only"},
            "versions": {
                "bbbb": {
                    "file": {"name": "/org.example.notes_20.apk"},
                    "manifest": {"versionName": "2.0", "versionCode": 20, "nativecode": ["armeabi-v7a"]}
                },
                "aaaa": {
                    "file": {"name": "/org.example.notes_19.apk"},
                    "manifest": {"versionName": "1.9", "versionCode": 19}
                }
            }
        },
        "org.example.x86only": {
            "versions": {
                "cccc": {
                    "file": {"name": "/org.example.x86only_1.apk"},
                    "manifest": {"nativecode": ["x86"]}
                }
            }
        }
    }
}"#;

fn entry_json(index: &str) -> String {
    format!(
        r#"{{"timestamp": 1, "version": 20002, "index": {{"name": "/index-v2.json", "sha256": "{}"}}}}"#,
        Sha256Digest::compute(index.as_bytes())
    )
}

async fn mock_entry(server: &mut ServerGuard, prefix: &str, index: &str, hits: usize) -> Mock {
    server
        .mock("GET", format!("{prefix}/entry.json").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(entry_json(index))
        .expect(hits)
        .create_async()
        .await
}

async fn mock_index(server: &mut ServerGuard, prefix: &str, index: &str, hits: usize) -> Mock {
    server
        .mock("GET", format!("{prefix}/index-v2.json").as_str())
        .with_status(200)
        .with_body(index)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn ensure_fresh_downloads_when_cache_is_empty() {
    let mut server = Server::new_async().await;
    let entry = mock_entry(&mut server, "/repo", INDEX, 1).await;
    let index = mock_index(&mut server, "/repo", INDEX, 1).await;

    let tmp = TempDir::new().unwrap();
    let cache_dir = tmp.path().join("repos").join("example.org");
    let repo_url = format!("{}/repo", server.url());

    let cached = index_cache::ensure_fresh(&Client::new(), &repo_url, &cache_dir)
        .await
        .unwrap();

    assert!(cached.refreshed);
    assert_eq!(cached.file_name, "/index-v2.json");
    assert_eq!(cached.path, cache_dir.join("index-v2.json"));
    assert_eq!(std::fs::read_to_string(&cached.path).unwrap(), INDEX);
    entry.assert_async().await;
    index.assert_async().await;
}

#[tokio::test]
async fn ensure_fresh_trusts_matching_cache() {
    let mut server = Server::new_async().await;
    let entry = mock_entry(&mut server, "/repo", INDEX, 1).await;
    let index = mock_index(&mut server, "/repo", INDEX, 0).await;

    let tmp = TempDir::new().unwrap();
    let cached_file = tmp.path().join("index-v2.json");
    std::fs::write(&cached_file, INDEX).unwrap();
    let before = std::fs::metadata(&cached_file).unwrap().modified().unwrap();

    let repo_url = format!("{}/repo", server.url());
    let cached = index_cache::ensure_fresh(&Client::new(), &repo_url, tmp.path())
        .await
        .unwrap();

    assert!(!cached.refreshed);
    assert_eq!(&cached.bytes[..], INDEX.as_bytes());
    let after = std::fs::metadata(&cached_file).unwrap().modified().unwrap();
    assert_eq!(before, after);
    entry.assert_async().await;
    index.assert_async().await;
}

#[tokio::test]
async fn ensure_fresh_replaces_stale_cache_once() {
    let mut server = Server::new_async().await;
    let entry = mock_entry(&mut server, "/repo", INDEX, 2).await;
    let index = mock_index(&mut server, "/repo", INDEX, 1).await;

    let tmp = TempDir::new().unwrap();
    let cached_file = tmp.path().join("index-v2.json");
    std::fs::write(&cached_file, r#"{"packages": {}}"#).unwrap();

    let client = Client::new();
    let repo_url = format!("{}/repo", server.url());

    let first = index_cache::ensure_fresh(&client, &repo_url, tmp.path())
        .await
        .unwrap();
    assert!(first.refreshed);
    assert_eq!(std::fs::read_to_string(&cached_file).unwrap(), INDEX);

    let second = index_cache::ensure_fresh(&client, &repo_url, tmp.path())
        .await
        .unwrap();
    assert!(!second.refreshed);

    entry.assert_async().await;
    index.assert_async().await;
}

#[tokio::test]
async fn ensure_fresh_fails_on_http_error() {
    let mut server = Server::new_async().await;
    let _entry = server
        .mock("GET", "/repo/entry.json")
        .with_status(503)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let repo_url = format!("{}/repo", server.url());
    let err = index_cache::ensure_fresh(&Client::new(), &repo_url, tmp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Fetch { .. }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn ensure_fresh_rejects_escaping_index_name() {
    let mut server = Server::new_async().await;
    let _entry = server
        .mock("GET", "/repo/entry.json")
        .with_status(200)
        .with_body(format!(
            r#"{{"index": {{"name": "/../../evil.json", "sha256": "{}"}}}}"#,
            Sha256Digest::compute(b"")
        ))
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let repo_url = format!("{}/repo", server.url());
    let err = index_cache::ensure_fresh(&Client::new(), &repo_url, tmp.path())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Parse {
            source: ParseError::InvalidPath(_),
            ..
        }
    ));
}

#[tokio::test]
async fn fetch_if_absent_downloads_once() {
    let mut server = Server::new_async().await;
    let apk = server
        .mock("GET", "/repo/org.example.notes_19.apk")
        .with_status(200)
        .with_body(b"PK\x03\x04apk-bytes")
        .expect(1)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let dest_dir = tmp.path().join("apks");
    let client = Client::new();
    let repo_url = format!("{}/repo", server.url());

    let first =
        artifact::fetch_if_absent(&client, &repo_url, "/org.example.notes_19.apk", &dest_dir)
            .await
            .unwrap();
    let second =
        artifact::fetch_if_absent(&client, &repo_url, "/org.example.notes_19.apk", &dest_dir)
            .await
            .unwrap();

    assert_eq!(first, dest_dir.join("org.example.notes_19.apk"));
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&first).unwrap(), b"PK\x03\x04apk-bytes");
    apk.assert_async().await;
}

#[tokio::test]
async fn fetch_if_absent_leaves_nothing_behind_on_failure() {
    let mut server = Server::new_async().await;
    let _apk = server
        .mock("GET", "/repo/gone.apk")
        .with_status(404)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let repo_url = format!("{}/repo", server.url());
    let err = artifact::fetch_if_absent(&Client::new(), &repo_url, "/gone.apk", tmp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Fetch { .. }));
    assert!(!tmp.path().join("gone.apk").exists());
}

#[tokio::test]
async fn registry_opens_each_domain_once() {
    let mut server = Server::new_async().await;
    let entry = mock_entry(&mut server, "/repo", INDEX, 1).await;
    let index = mock_index(&mut server, "/repo", INDEX, 1).await;

    let tmp = TempDir::new().unwrap();
    let mut registry = RepositoryRegistry::new(Client::new(), tmp.path());

    let repo = registry
        .get_or_create(&format!("{}/repo", server.url()))
        .await
        .unwrap();
    let archive = registry
        .get_or_create(&format!("{}/archive", server.url()))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&repo, &archive));
    assert_eq!(registry.len(), 1);
    assert!(registry.get(&format!("{}/anything", server.url())).is_some());
    assert!(repo.index_path().starts_with(tmp.path().join(repo.domain())));
    entry.assert_async().await;
    index.assert_async().await;
}

#[tokio::test]
async fn registry_registers_nothing_on_failure() {
    let mut server = Server::new_async().await;
    let _entry = mock_entry(&mut server, "/repo", r#"{"apps": []}"#, 1).await;
    let _index = mock_index(&mut server, "/repo", r#"{"apps": []}"#, 1).await;

    let tmp = TempDir::new().unwrap();
    let mut registry = RepositoryRegistry::new(Client::new(), tmp.path());

    let err = registry
        .get_or_create(&format!("{}/repo", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Parse {
            source: ParseError::MissingPackages,
            ..
        }
    ));
    assert!(registry.is_empty());

    let err = registry.get_or_create("http://localhost/repo").await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidUrl { .. }));
}

#[tokio::test]
async fn resolve_and_download_end_to_end() {
    let mut server = Server::new_async().await;
    let _entry = mock_entry(&mut server, "/repo", INDEX, 1).await;
    let _index = mock_index(&mut server, "/repo", INDEX, 1).await;
    let apk = server
        .mock("GET", "/repo/org.example.notes_19.apk")
        .with_status(200)
        .with_body("notes-19")
        .expect(1)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let repo = Repository::open(
        Client::new(),
        &format!("{}/repo/", server.url()),
        &tmp.path().join("repos"),
        Preference::IndexOrder,
    )
    .await
    .unwrap();
    assert_eq!(repo.url(), format!("{}/repo", server.url()));
    assert_eq!(repo.catalog().len(), 2);

    let apks = tmp.path().join("apks");
    let path = repo
        .resolve_and_download("org.example.notes", Arch::ArmV8A, &apks)
        .await
        .unwrap();
    assert_eq!(path, apks.join("org.example.notes_19.apk"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "notes-19");
    apk.assert_async().await;

    for (app, arch) in [
        ("org.example.missing", Arch::ArmV8A),
        ("org.example.notes", Arch::Unknown),
        ("org.example.x86only", Arch::ArmV7A),
    ] {
        let err = repo
            .resolve_and_download(app, arch, &apks)
            .await
            .unwrap_err();
        assert!(err.is_recoverable(), "{err}");
    }
}
