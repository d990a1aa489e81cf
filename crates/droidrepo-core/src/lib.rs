//! droidrepo core: keep a local mirror of F-Droid style repository indexes,
//! pick the right build of an app for a device architecture, and download it
//! once.
//!
//! ```text
//! RepositoryRegistry::get_or_create(url)
//!   └─ domain::normalize ── existing? ──> Arc<Repository>
//!                          └─ Repository::open
//!                               ├─ index_cache::ensure_fresh   (entry.json + index)
//!                               └─ Catalog::parse
//! Repository::resolve_and_download(app, arch, dir)
//!   ├─ resolver::resolve
//!   └─ artifact::fetch_if_absent
//! ```
//!
//! Cache layout:
//!
//! ```text
//! <repos_root>/
//! └── f-droid.org/
//!     └── index-v2.json   # checked against entry.json's sha256 on every open
//! ```

pub mod artifact;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod http;
pub mod index_cache;
pub mod paths;
pub mod registry;
pub mod repository;
pub mod resolver;

pub use catalog::Catalog;
pub use domain::RepositoryIdentity;
pub use error::{ParseError, RepoError};
pub use registry::RepositoryRegistry;
pub use repository::Repository;
pub use resolver::{Preference, ResolvedVersion};

/// User Agent string for repository requests
pub const USER_AGENT: &str = concat!("droidrepo/", env!("CARGO_PKG_VERSION"));
