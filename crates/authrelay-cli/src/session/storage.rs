//! Session storage for persisting login state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::CliSession;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub base_url: String,
    pub refresh_path: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "authrelay").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk.
pub fn save_session(stored: &StoredSession) -> Result<()> {
    write_to(&session_path()?, stored)
}

/// Load a session from disk.
pub fn load_session() -> Result<Option<StoredSession>> {
    read_from(&session_path()?)
}

/// Clear the stored session. Returns whether a session existed.
pub fn clear_session() -> Result<bool> {
    remove_at(&session_path()?)
}

/// Write back the tokens after a command, or drop the file if the session
/// was signed out by a failed refresh.
pub fn persist(session: &CliSession) -> Result<()> {
    match session.to_stored() {
        Some(stored) => save_session(&stored),
        None => clear_session().map(|_| ()),
    }
}

fn write_to(path: &Path, stored: &StoredSession) -> Result<()> {
    let json = serde_json::to_string_pretty(stored)?;
    fs::write(path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

fn read_from(path: &Path) -> Result<Option<StoredSession>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path).context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;
    Ok(Some(stored))
}

fn remove_at(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).context("Failed to remove session file")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredSession {
        StoredSession {
            base_url: "https://api.example.com".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            access_token: "access".to_string(),
            refresh_token: None,
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        write_to(&path, &sample()).unwrap();
        assert_eq!(read_from(&path).unwrap(), Some(sample()));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("refresh_token"));
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        write_to(&path, &sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert_eq!(read_from(&path).unwrap(), None);
        assert!(!remove_at(&path).unwrap());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        assert!(read_from(&path).is_err());
        assert!(remove_at(&path).unwrap());
        assert!(!path.exists());
    }
}
