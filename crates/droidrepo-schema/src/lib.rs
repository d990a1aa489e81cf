//! Shared types and wire format for droidrepo.
//!
//! Everything that crosses the network or the on-disk cache lives here so the
//! core and CLI crates agree on one definition.

pub mod arch;
pub mod hash;
pub mod index;
pub mod types;

// Re-exports
pub use arch::*;
pub use hash::*;
pub use index::{AppEntry, EntryDescriptor, FileEntry, IndexFileRef, VersionEntry, VersionManifest};
pub use types::*;

/// Name of the entry descriptor every repository serves at its root.
pub const ENTRY_FILE: &str = "entry.json";
