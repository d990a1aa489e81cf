//! Content digests used to check cached repository data.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Error returned when a string is not a valid SHA-256 hex digest.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The hex portion is not exactly 64 characters long.
    #[error("Invalid SHA256 digest: expected 64 hex characters, got {len} in '{value}'")]
    Length {
        /// Number of characters found.
        len: usize,
        /// The rejected input.
        value: String,
    },

    /// The input contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NotHex(String),
}

/// A validated SHA256 digest (64 lowercase hex characters).
///
/// Repositories advertise the hash of their current index in `entry.json`;
/// this newtype makes sure the advertised value is well-formed before it is
/// compared against a locally computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix and normalises the
    /// hex to lowercase.
    ///
    /// # Errors
    ///
    /// Returns a [`DigestError`] if the hex portion is not exactly 64 ASCII
    /// hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(DigestError::Length {
                len: hex.len(),
                value: s.clone(),
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NotHex(s.clone()));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Compute the SHA256 digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Compute the SHA256 digest of a file by reading it entirely into memory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn compute_file(path: &std::path::Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::compute(&data))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello world")
    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn compute_matches_known_vector() {
        assert_eq!(Sha256Digest::compute(b"hello world").as_str(), HELLO);
    }

    #[test]
    fn new_normalises_case_and_prefix() {
        let upper = Sha256Digest::new(format!("sha256:{}", HELLO.to_uppercase())).unwrap();
        assert_eq!(upper, Sha256Digest::compute(b"hello world"));
    }

    #[test]
    fn new_rejects_bad_digests() {
        assert!(matches!(
            Sha256Digest::new("abc"),
            Err(DigestError::Length { len: 3, .. })
        ));
        let not_hex = "z".repeat(64);
        assert!(matches!(
            Sha256Digest::new(not_hex),
            Err(DigestError::NotHex(_))
        ));
    }

    #[test]
    fn compute_file_matches_compute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"hello world").unwrap();
        assert_eq!(Sha256Digest::compute_file(&path).unwrap().as_str(), HELLO);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Sha256Digest = serde_json::from_str(&format!("\"{HELLO}\"")).unwrap();
        assert_eq!(ok.as_str(), HELLO);
        assert!(serde_json::from_str::<Sha256Digest>("\"nope\"").is_err());
    }
}
