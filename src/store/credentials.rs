// src/store/credentials.rs
// =============================================================================
// Encrypted storage for a reusable login.
//
// Two files live in the output directory:
// - .key     32 random bytes, created on first use and reused afterwards
// - .config  {"username": "...", "password": "<base64(nonce || ciphertext)>"}
//
// The password is sealed with ChaCha20-Poly1305 and a fresh random nonce on
// every save. Deleting or altering .key makes the stored password
// unrecoverable; loading then reports nothing and the operator is asked again.
// =============================================================================

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::CredentialError;

const KEY_FILE: &str = ".key";
const CONFIG_FILE: &str = ".config";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    username: String,
    /// base64 of nonce followed by ciphertext
    password: String,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Encrypts `password` and stores it together with `username`.
    pub fn save_credentials(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        fs::create_dir_all(&self.dir)?;
        let cipher = ChaCha20Poly1305::new(&self.load_or_create_key()?);

        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, password.as_bytes())
            .map_err(|_| CredentialError::Crypto)?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);

        let record = CredentialRecord {
            username: username.to_string(),
            password: STANDARD.encode(sealed),
        };
        write_private(&self.config_path(), serde_json::to_string_pretty(&record)?.as_bytes())?;

        debug!(username, "credentials saved");
        Ok(())
    }

    /// Returns the stored (username, password), or `None` if there is nothing
    /// usable. Failures are logged, never raised.
    pub fn load_credentials(&self) -> Option<(String, String)> {
        if !self.config_path().exists() {
            return None;
        }
        match self.try_load() {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!("stored credentials are unusable: {}", e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<(String, String), CredentialError> {
        let record: CredentialRecord =
            serde_json::from_str(&fs::read_to_string(self.config_path())?)?;
        let sealed = STANDARD.decode(record.password)?;
        if sealed.len() < NONCE_LEN {
            return Err(CredentialError::Crypto);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = ChaCha20Poly1305::new(&self.read_key()?);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CredentialError::Crypto)?;
        let password = String::from_utf8(plaintext).map_err(|_| CredentialError::Crypto)?;

        Ok((record.username, password))
    }

    fn read_key(&self) -> Result<Key, CredentialError> {
        let bytes = fs::read(self.key_path())?;
        if bytes.len() != KEY_LEN {
            return Err(CredentialError::InvalidKey(bytes.len()));
        }
        Ok(Key::clone_from_slice(&bytes))
    }

    // The key is generated once per directory and reused from then on
    fn load_or_create_key(&self) -> Result<Key, CredentialError> {
        if self.key_path().exists() {
            return self.read_key();
        }
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        write_private(&self.key_path(), key.as_slice())?;
        debug!(path = %self.key_path().display(), "generated new credential key");
        Ok(key)
    }
}

// Writes a file readable only by the owner where the platform supports it
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an AEAD cipher?
//    - Authenticated Encryption with Associated Data
//    - decrypt() fails if the key or the ciphertext was changed, instead of returning garbage
//
// 2. Why a new nonce on every save?
//    - ChaCha20-Poly1305 must never reuse a (key, nonce) pair
//    - The nonce is not secret, so it is stored in front of the ciphertext
//
// 3. #[cfg(unix)]
//    - The block only compiles on Unix, where file permission bits exist
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();

        assert_eq!(
            store.load_credentials(),
            Some(("alice".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn test_password_is_not_stored_in_clear() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();

        let config = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.contains("alice"));
        assert!(!config.contains("s3cret"));
    }

    #[test]
    fn test_key_is_reused() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "one").unwrap();
        let first_key = fs::read(dir.path().join(KEY_FILE)).unwrap();
        store.save_credentials("alice", "two").unwrap();
        let second_key = fs::read(dir.path().join(KEY_FILE)).unwrap();

        assert_eq!(first_key, second_key);
        assert_eq!(store.load_credentials().unwrap().1, "two");
    }

    #[test]
    fn test_nothing_stored() {
        let dir = tempdir().unwrap();
        assert!(CredentialStore::new(dir.path()).load_credentials().is_none());
    }

    #[test]
    fn test_corrupted_key_returns_nothing() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();

        // Same length, different bytes: authentication fails
        let mut key = fs::read(dir.path().join(KEY_FILE)).unwrap();
        key.iter_mut().for_each(|b| *b ^= 0xff);
        fs::write(dir.path().join(KEY_FILE), &key).unwrap();
        assert!(store.load_credentials().is_none());

        // Wrong length
        fs::write(dir.path().join(KEY_FILE), b"short").unwrap();
        assert!(store.load_credentials().is_none());
    }

    #[test]
    fn test_missing_key_returns_nothing() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();
        fs::remove_file(dir.path().join(KEY_FILE)).unwrap();

        assert!(store.load_credentials().is_none());
    }

    #[test]
    fn test_corrupted_record_returns_nothing() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"username": "alice", "password": "!!not base64!!"}"#,
        )
        .unwrap();

        assert!(store.load_credentials().is_none());
    }
}
