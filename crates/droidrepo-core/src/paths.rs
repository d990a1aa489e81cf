use dirs::home_dir;
use std::path::PathBuf;

/// Environment variable overriding the droidrepo home directory.
pub const HOME_ENV: &str = "DROIDREPO_HOME";

/// Returns the droidrepo home directory, or None if the user's home cannot be resolved.
pub fn try_droidrepo_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV) {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".droidrepo"))
}

/// Repository index cache: ~/.droidrepo/repos
pub fn repos_path() -> Option<PathBuf> {
    try_droidrepo_home().map(|h| h.join("repos"))
}

/// Downloaded artifacts: ~/.droidrepo/apks
pub fn apks_path() -> Option<PathBuf> {
    try_droidrepo_home().map(|h| h.join("apks"))
}
