//! Durable token storage across process restarts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use tracing::{debug, warn};

use super::tokens::StoredTokens;
use crate::{Error, Result};

/// Somewhere a [`StoredTokens`] record can be kept between runs.
///
/// The session reads from it once at construction and writes to it after
/// every successful login or refresh. Writes run on tokio's blocking pool,
/// so implementations may do synchronous I/O.
pub trait CredentialStore: Send + Sync {
    /// Read the saved record, `Ok(None)` when nothing is saved.
    fn load(&self) -> Result<Option<StoredTokens>>;

    /// Replace the saved record.
    fn save(&self, tokens: &StoredTokens) -> Result<()>;

    /// Remove the saved record; a no-op when nothing is saved.
    fn clear(&self) -> Result<()>;

    /// Whether a record is currently saved.
    fn exists(&self) -> bool;
}

/// JSON file store.
///
/// # Example
///
/// ```no_run
/// use axiomtrade_rs::auth::FileCredentialStore;
///
/// let store = FileCredentialStore::default_location()?;
/// println!("Tokens live at {}", store.path().display());
/// # Ok::<(), axiomtrade_rs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store tokens in the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store tokens in `tokens.json` under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("tokens.json"))
    }

    /// `<config dir>/axiomtrade/tokens.json`.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| Error::Config("Could not determine a config directory".to_string()))?;
        Ok(Self::in_dir(dir.join("axiomtrade")))
    }

    /// File this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        if !self.path.exists() {
            debug!("No saved tokens at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(tokens) => {
                debug!("Loaded saved tokens from {:?}", self.path);
                Ok(Some(tokens))
            }
            Err(e) => {
                warn!("Ignoring unreadable token file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(tokens)?;

        // Private temp file beside the target, renamed over it once complete.
        let mut file = NamedTempFile::new_in(dir)?;
        restrict_permissions(file.path())?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved tokens to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
