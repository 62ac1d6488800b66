use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::session::model::TokenPair;

/// Durable home of the token pair.
///
/// The session holder is the only caller; it loads once at startup and
/// writes through on every token change.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>, ClientError>;

    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError>;

    fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ClientError> {
        Ok(self.tokens.lock().clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        *self.tokens.lock() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.tokens.lock() = None;
        Ok(())
    }
}

/// JSON file holding `{"access": ..., "refresh": ...}`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<TokenPair>(&raw) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                // Unreadable cache counts as signed out.
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                Ok(None)
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_vec(tokens)?;
        let tmp = self.temp_path();
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Persisted token pair");
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
