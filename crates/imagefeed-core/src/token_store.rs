//! Secure storage for the single bearer token.
//!
//! Backed by the OS keyring so the token survives process restarts
//! without touching the filesystem. The token is an opaque passthrough;
//! nothing here validates its shape.

use std::sync::Mutex;

use thiserror::Error;

const KEYRING_SERVICE: &str = "com.imagefeed.client";
const TOKEN_KEY: &str = "bearerToken";

/// Errors raised when writing to the backing store.
#[derive(Error, Debug)]
pub enum TokenStoreError {
    /// OS keyring operation failed.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

enum Backend {
    Keyring,
    /// Process-local storage, used by tests and headless environments.
    Memory(Mutex<Option<String>>),
}

/// Holds at most one bearer token process-wide.
///
/// Every other component treats the stored token as read-only; the
/// OAuth service writes it on a successful exchange and the logout
/// service clears it.
pub struct TokenStore {
    backend: Backend,
}

impl TokenStore {
    /// Store backed by the OS keyring under a fixed service/key pair.
    pub fn new() -> Self {
        Self { backend: Backend::Keyring }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self { backend: Backend::Memory(Mutex::new(None)) }
    }

    /// Read the stored token. Read failures degrade to `None`.
    pub fn get(&self) -> Option<String> {
        match &self.backend {
            Backend::Keyring => match keyring_entry() {
                Ok(entry) => match entry.get_password() {
                    Ok(token) => Some(token),
                    Err(keyring::Error::NoEntry) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read token from keyring");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open keyring entry");
                    None
                }
            },
            Backend::Memory(slot) => slot.lock().ok().and_then(|guard| guard.clone()),
        }
    }

    /// Write or remove the stored token; `None` removes it.
    pub fn set(&self, token: Option<&str>) -> Result<(), TokenStoreError> {
        match &self.backend {
            Backend::Keyring => {
                let entry = keyring_entry().map_err(|e| TokenStoreError::Keyring(e.to_string()))?;
                match token {
                    Some(token) => entry
                        .set_password(token)
                        .map_err(|e| TokenStoreError::Keyring(e.to_string())),
                    None => match entry.delete_credential() {
                        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                        Err(e) => Err(TokenStoreError::Keyring(e.to_string())),
                    },
                }
            }
            Backend::Memory(slot) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = token.map(str::to_owned);
                }
                Ok(())
            }
        }
    }
}

fn keyring_entry() -> keyring::Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, TOKEN_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get(), None);

        store.set(Some("tok")).unwrap();
        assert_eq!(store.get().as_deref(), Some("tok"));

        store.set(Some("tok2")).unwrap();
        assert_eq!(store.get().as_deref(), Some("tok2"));

        store.set(None).unwrap();
        assert_eq!(store.get(), None);
    }
}
