//! Persisted clinic-staff credentials.
//!
//! A successful login yields a bearer token and the clinic the staff member acts for. Both are
//! stored together in one JSON file so that later invocations can call protected endpoints.
//! An expired token (a `401` from the backend) removes the file.

use crate::{CoreError, CoreResult};
use ctrls_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Credentials for protected endpoints. A stored file with a blank value fails to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub token: NonEmptyText,
    pub clinic_id: NonEmptyText,
}

impl AuthState {
    /// Creates a new `AuthState`.
    ///
    /// # Arguments
    ///
    /// * `token` - bearer token returned by the login endpoint.
    /// * `clinic_id` - tenant the staff member logged in to.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either value is blank.
    pub fn new(token: impl AsRef<str>, clinic_id: impl AsRef<str>) -> CoreResult<Self> {
        let token = NonEmptyText::new(token)
            .map_err(|e| CoreError::InvalidInput(format!("token: {e}")))?;
        let clinic_id = NonEmptyText::new(clinic_id)
            .map_err(|e| CoreError::InvalidInput(format!("clinic_id: {e}")))?;
        Ok(Self { token, clinic_id })
    }
}

/// File-backed store for [`AuthState`].
#[derive(Clone, Debug)]
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    /// Creates a store backed by `path`. Nothing is read or written until first use.
    ///
    /// # Arguments
    ///
    /// * `path` - JSON file holding the credentials; parent directories are created on save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credentials. A missing file means "not logged in".
    pub fn load(&self) -> CoreResult<Option<AuthState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::AuthFileRead(e)),
        };
        let state = serde_json::from_str(&contents).map_err(CoreError::AuthDeserialization)?;
        Ok(Some(state))
    }

    /// Write `state`, replacing any stored credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if the directory cannot be created or the file cannot be written.
    pub fn save(&self, state: &AuthState) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CoreError::AuthDirCreation)?;
        }
        let json = serde_json::to_string_pretty(state).map_err(CoreError::AuthSerialization)?;
        fs::write(&self.path, json).map_err(CoreError::AuthFileWrite)?;
        tracing::debug!(path = %self.path.display(), "saved auth state");
        Ok(())
    }

    /// Forget the stored credentials. Clearing an empty store is not an error.
    pub fn clear(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "cleared auth state");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::AuthFileRemove(e)),
        }
    }

    /// True when both a token and a clinic are stored.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_logged_out() {
        let dir = TempDir::new().expect("tempdir");
        let store = AuthStore::new(dir.path().join("auth.json"));
        assert_eq!(store.load().expect("load"), None);
        assert!(!store.is_authenticated());
        store.clear().expect("clearing nothing is fine");
    }

    #[test]
    fn save_then_load_then_clear() {
        let dir = TempDir::new().expect("tempdir");
        let store = AuthStore::new(dir.path().join("nested").join("auth.json"));
        let state = AuthState::new("tok-123", "clinic-9").expect("state");

        store.save(&state).expect("save");
        assert!(store.is_authenticated());
        assert_eq!(store.load().expect("load"), Some(state));

        let raw = fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("\"clinicId\""), "{raw}");

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("auth.json");
        fs::write(&path, "not json").expect("write");
        let err = AuthStore::new(path).load().expect_err("corrupt");
        assert!(matches!(err, CoreError::AuthDeserialization(_)));
    }

    #[test]
    fn stored_blank_token_fails_to_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"token":"  ","clinicId":"clinic-9"}"#).expect("write");
        let store = AuthStore::new(path);
        let err = store.load().expect_err("blank token");
        assert!(matches!(err, CoreError::AuthDeserialization(e) if e.to_string().contains("cannot be empty")));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn blank_values_are_rejected() {
        let err = AuthState::new("  ", "clinic").expect_err("blank token");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("token")));
        let err = AuthState::new("tok", "").expect_err("blank clinic");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("clinic_id")));
    }
}
