//! Saved administrator credentials used for auto-login.
//!
//! Stored as a small TOML file. The pair is always written together and a
//! missing or unreadable file loads as empty strings.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential file I/O failed ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Administrator username/password pair.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "admin_username", default)]
    pub username: String,
    #[serde(rename = "admin_password", default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields present; auto-login is only attempted when true.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved pair, or empty strings if nothing usable is stored.
    pub fn load(&self) -> Credentials {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Credentials::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read credentials");
                return Credentials::default();
            }
        };

        match toml::from_str(&text) {
            Ok(creds) => creds,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed credentials file");
                Credentials::default()
            }
        }
    }

    /// Persist both fields, replacing whatever was stored before.
    ///
    /// Writes to a sibling temp file and renames it over the target so a
    /// crash never leaves a half-written pair.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        let text = toml::to_string(credentials)?;
        let io_err = |source| CredentialError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let tmp = self.path.with_extension("toml.tmp");
        {
            let mut file = open_private(&tmp).map_err(io_err)?;
            file.write_all(text.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::info!(path = %self.path.display(), username = %credentials.username, "credentials saved");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("nested").join("credentials.toml"))
    }

    #[test]
    fn test_load_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let creds = store_in(&dir).load();
        assert_eq!(creds, Credentials::default());
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("admin", "secret")).unwrap();
        assert_eq!(store.load(), Credentials::new("admin", "secret"));
    }

    #[test]
    fn test_save_overwrites_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("admin", "one")).unwrap();
        store.save(&Credentials::new("root", "two")).unwrap();
        assert_eq!(store.load(), Credentials::new("root", "two"));
    }

    #[test]
    fn test_file_uses_admin_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("admin", "secret")).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("admin_username = \"admin\""));
        assert!(text.contains("admin_password = \"secret\""));
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(CredentialStore::new(path).load(), Credentials::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("admin", "secret")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_debug_redacts_password() {
        let text = format!("{:?}", Credentials::new("admin", "secret"));
        assert!(text.contains("admin"));
        assert!(!text.contains("secret"));
    }
}
