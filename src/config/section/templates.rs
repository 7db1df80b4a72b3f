//! `[templates]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [templates]
//! dir = "templates"                   # Template root (identifiers are relative to it)
//! stylesheet = "templates/shared.css" # Injected into every document's <head>
//! assets = "templates/assets"         # Base for inlined images (default: dir)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Template root directory.
    pub dir: PathBuf,

    /// Shared stylesheet path.
    pub stylesheet: PathBuf,

    /// Base directory for resolving image references.
    /// - unset (default): the template root
    pub assets: Option<PathBuf>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: "templates".into(),
            stylesheet: "templates/shared.css".into(),
            assets: None,
        }
    }
}
