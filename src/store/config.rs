//! Store configuration and logical name resolution

use std::path::{Path, PathBuf};

/// Prefix that redirects a logical name to the installation root
pub const ROOT_MARKER: &str = "<root>/";

/// Default name of the data directory under the installation root
pub const DEFAULT_DATA_DIR: &str = "db";

const JSON_SUFFIX: &str = ".json";

/// Configuration for the DocumentStore
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Installation root; `<root>/` names resolve here
    pub root_dir: PathBuf,
    /// Directory name (under `root_dir`) holding regular documents
    pub data_dir_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            data_dir_name: DEFAULT_DATA_DIR.to_string(),
        }
    }
}

impl StoreConfig {
    /// Create config rooted at the given installation directory
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Override the data directory name
    pub fn with_data_dir_name(mut self, name: impl Into<String>) -> Self {
        self.data_dir_name = name.into();
        self
    }

    /// Get the installation root
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get path to the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.root_dir.join(&self.data_dir_name)
    }

    /// Resolve a logical document name to its physical path.
    ///
    /// A single trailing `.json` is stripped before `.json` is appended, so
    /// `"foo"` and `"foo.json"` map to the same file. Names starting with
    /// [`ROOT_MARKER`] land under the installation root, everything else
    /// under the data directory.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let name = name.strip_suffix(JSON_SUFFIX).unwrap_or(name);

        match name.strip_prefix(ROOT_MARKER) {
            Some(rest) => self.root_dir.join(format!("{}{}", rest, JSON_SUFFIX)),
            None => self.data_dir().join(format!("{}{}", name, JSON_SUFFIX)),
        }
    }
}
