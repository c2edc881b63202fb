//! services/client/src/adapters/storage.rs
//!
//! File-backed implementation of the `CredentialStorage` port.
//!
//! The credential lives under a fixed key in a small JSON document. Unrelated keys
//! in the same file are left alone. The file is written with mode 0600 on Unix,
//! and the token itself is never logged.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use copilot_core::domain::Credential;
use copilot_core::ports::{CredentialStorage, PortError, PortResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key under which the session credential is stored.
pub const CREDENTIAL_KEY: &str = "access_token";

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    saved_at: DateTime<Utc>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the whole document. A missing file is an empty document.
    fn read_entries(&self) -> PortResult<Map<String, Value>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(storage_error(e)),
        };
        serde_json::from_str(&data).map_err(storage_error)
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(storage_error)?;
            }
        }

        let data = serde_json::to_string_pretty(entries).map_err(storage_error)?;

        // A failed write leaves the previous document intact.
        let temp_path = self.temp_path();
        let written = write_private(&temp_path, data.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(storage_error(e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes `data` to `path` readable by the owner only, whatever mode the file had before.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(data)?;
    file.sync_all()
}

fn storage_error(e: impl std::fmt::Display) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// `CredentialStorage` Trait Implementation
//=========================================================================================

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> PortResult<Option<Credential>> {
        let mut entries = self.read_entries()?;
        let Some(value) = entries.remove(CREDENTIAL_KEY) else {
            return Ok(None);
        };

        let stored: StoredCredential = serde_json::from_value(value).map_err(storage_error)?;
        debug!(saved_at = %stored.saved_at, "Loaded persisted credential.");
        Ok(Credential::new(stored.token))
    }

    fn save(&self, credential: &Credential) -> PortResult<()> {
        // A corrupt document is replaced rather than blocking the login.
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!("Replacing unreadable credential file {}: {}", self.path.display(), e);
            Map::new()
        });

        let stored = StoredCredential {
            token: credential.as_str().to_string(),
            saved_at: Utc::now(),
        };
        entries.insert(
            CREDENTIAL_KEY.to_string(),
            serde_json::to_value(stored).map_err(storage_error)?,
        );
        self.write_entries(&entries)
    }

    fn clear(&self) -> PortResult<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Removing unreadable credential file {}: {}", self.path.display(), e);
                return remove_file(&self.path);
            }
        };

        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            remove_file(&self.path)
        } else {
            self.write_entries(&entries)
        }
    }
}

fn remove_file(path: &Path) -> PortResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(storage_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_no_credential() {
        let dir = tempdir().unwrap();
        let storage = FileCredentialStorage::new(dir.path().join("credentials.json"));
        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();
    }

    #[test]
    fn save_then_load_round_trips_in_a_fresh_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        FileCredentialStorage::new(&path)
            .save(&Credential::new("tok-123").unwrap())
            .unwrap();

        let reloaded = FileCredentialStorage::new(&path).load().unwrap();
        assert_eq!(reloaded, Credential::new("tok-123"));
    }

    #[test]
    fn clear_removes_the_file_when_nothing_else_is_stored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let storage = FileCredentialStorage::new(&path);

        storage.save(&Credential::new("tok-123").unwrap()).unwrap();
        assert!(path.exists());

        storage.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn clear_preserves_unrelated_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        let storage = FileCredentialStorage::new(&path);

        storage.save(&Credential::new("tok-123").unwrap()).unwrap();
        storage.clear().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("theme"));
        assert!(!contents.contains("tok-123"));
    }

    #[test]
    fn corrupt_file_is_a_storage_error_on_load_and_removed_on_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileCredentialStorage::new(&path);

        assert!(matches!(storage.load(), Err(PortError::Storage(_))));
        storage.clear().unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn credential_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        FileCredentialStorage::new(&path)
            .save(&Credential::new("tok-123").unwrap())
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_world_readable_file_is_tightened_on_save() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileCredentialStorage::new(&path)
            .save(&Credential::new("secret-token").unwrap())
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(fs::read_to_string(&path).unwrap().contains("secret-token"));
    }

    #[test]
    fn save_replaces_the_file_without_leaving_a_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        let storage = FileCredentialStorage::new(&path);

        storage.save(&Credential::new("tok-1").unwrap()).unwrap();
        storage.save(&Credential::new("tok-2").unwrap()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("credentials.json")]);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("theme"));
        assert!(contents.contains("tok-2"));
    }

    #[test]
    fn failed_write_keeps_the_previous_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let storage = FileCredentialStorage::new(&path);
        storage.save(&Credential::new("tok-1").unwrap()).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(dir.path().join("credentials.json.tmp")).unwrap();

        assert!(matches!(
            storage.save(&Credential::new("tok-2").unwrap()),
            Err(PortError::Storage(_))
        ));
        assert_eq!(storage.load().unwrap(), Credential::new("tok-1"));
    }
}
