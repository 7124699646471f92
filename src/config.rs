//! Configuration for batch runs over fixture directories.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::DriverError;

/// Extension given to Piklisp source files.
pub const DEFAULT_EXTENSION: &str = "pgo";

/// Settings for [`run_batch`](crate::batch::run_batch) and its report.
///
/// Loadable from YAML; any field left out keeps its default:
///
/// ```yaml
/// extensions: [pgo, plisp]
/// use_colors: false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions (without the dot) treated as source units.
    pub extensions: Vec<String>,
    pub use_colors: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl BatchConfig {
    /// Reads a YAML config file.
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let text = fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| DriverError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// True if `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}
