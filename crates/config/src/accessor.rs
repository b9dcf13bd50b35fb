//! Configuration accessors
//!
//! The store never owns the configuration document. It goes through a
//! [`ConfigAccessor`] that loads and saves the whole tree.

use crate::tree::ConfigTree;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};
use types::ConfigError;

/// Load/save access to the full configuration tree
pub trait ConfigAccessor: Send + Sync {
    /// Current tree, or an empty default one when nothing is persisted
    fn load_config(&self) -> Result<ConfigTree, ConfigError>;

    /// Persist the whole tree
    fn save_config(&self, tree: &ConfigTree) -> Result<(), ConfigError>;
}

impl<A: ConfigAccessor + ?Sized> ConfigAccessor for &A {
    fn load_config(&self) -> Result<ConfigTree, ConfigError> {
        (**self).load_config()
    }

    fn save_config(&self, tree: &ConfigTree) -> Result<(), ConfigError> {
        (**self).save_config(tree)
    }
}

/// Extension manager configuration stored as a YAML file
#[derive(Debug, Clone)]
pub struct YamlFileConfig {
    path: PathBuf,
}

impl YamlFileConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
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

impl ConfigAccessor for YamlFileConfig {
    fn load_config(&self) -> Result<ConfigTree, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No configuration file, using empty tree");
            return Ok(ConfigTree::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(ConfigTree::new());
        }

        let parse_error = |e: serde_yaml::Error| ConfigError::Parse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        // A document that is only `~` or comments holds nothing yet.
        let document: Value = serde_yaml::from_str(&content).map_err(parse_error)?;
        if document.is_null() {
            return Ok(ConfigTree::new());
        }
        let tree: ConfigTree = serde_yaml::from_value(document).map_err(parse_error)?;

        debug!(path = %self.path.display(), "Configuration loaded");
        Ok(tree)
    }

    fn save_config(&self, tree: &ConfigTree) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(tree).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let write_error = |e: std::io::Error| ConfigError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        // Readers must never observe a partially written document.
        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, content).and_then(|_| fs::rename(&temp, &self.path)) {
            remove_temp(&temp);
            return Err(write_error(e));
        }

        debug!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

fn remove_temp(temp: &Path) {
    if !temp.exists() {
        return;
    }
    if let Err(e) = fs::remove_file(temp) {
        warn!(path = %temp.display(), error = %e, "Failed to remove temporary configuration file");
    }
}

/// In-process configuration tree
#[derive(Debug, Default)]
pub struct MemoryConfig {
    tree: Mutex<ConfigTree>,
    saves: AtomicUsize,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: ConfigTree) -> Self {
        Self {
            tree: Mutex::new(tree),
            saves: AtomicUsize::new(0),
        }
    }

    /// Copy of the current tree
    pub fn snapshot(&self) -> ConfigTree {
        self.lock().clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConfigTree> {
        // A poisoned lock still holds a whole tree; saves replace it atomically.
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigAccessor for MemoryConfig {
    fn load_config(&self) -> Result<ConfigTree, ConfigError> {
        Ok(self.snapshot())
    }

    fn save_config(&self, tree: &ConfigTree) -> Result<(), ConfigError> {
        *self.lock() = tree.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
