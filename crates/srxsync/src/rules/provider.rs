use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use tracing::debug;

use super::document::RulesDocument;
use crate::error::RulesError;

/// A rules document remembered together with the mtime it was read at.
#[derive(Debug)]
struct CachedRules {
    modified: SystemTime,
    document: RulesDocument,
}

/// Reads the segmentation rules file from disk.
///
/// The file is read fresh on every call unless caching is enabled, in which
/// case the previous read is reused for as long as the file's modification
/// time is unchanged.
#[derive(Debug)]
pub struct RulesProvider {
    path: PathBuf,
    cache_enabled: bool,
    cache: Mutex<Option<CachedRules>>,
}

impl RulesProvider {
    /// Creates a provider for `rules_file` resolved against `working_dir`.
    ///
    /// An absolute `rules_file` is used as-is.
    pub fn new(working_dir: impl AsRef<Path>, rules_file: impl AsRef<Path>) -> Self {
        Self {
            path: working_dir.as_ref().join(rules_file),
            cache_enabled: false,
            cache: Mutex::new(None),
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Resolved path of the rules file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the rules document.
    ///
    /// Returns [`RulesError::NotFound`] if the path does not resolve and
    /// [`RulesError::Read`] for any other I/O failure.
    pub async fn load(&self) -> Result<RulesDocument, RulesError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        let modified = if self.cache_enabled {
            metadata.modified().ok()
        } else {
            None
        };

        if let Some(modified) = modified {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref().filter(|c| c.modified == modified) {
                debug!("Using cached rules from {}", self.path.display());
                return Ok(cached.document.clone());
            }
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let document = RulesDocument::new(content, self.path.clone());

        if let Some(modified) = modified {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            *cache = Some(CachedRules {
                modified,
                document: document.clone(),
            });
        }

        debug!(
            "Loaded {} bytes of rules from {}",
            document.content().len(),
            self.path.display()
        );
        Ok(document)
    }

    fn io_error(&self, err: std::io::Error) -> RulesError {
        if err.kind() == ErrorKind::NotFound {
            RulesError::NotFound {
                path: self.path.clone(),
            }
        } else {
            RulesError::Read {
                path: self.path.clone(),
                source: err,
            }
        }
    }
}
