//! Pipeline configuration management for `docpress.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── templates  # [templates]
//! │   ├── pdf        # [pdf]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! └── mod.rs         # PressConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `[templates]`  | Template root, shared stylesheet, asset base     |
//! | `[pdf]`        | External converter command and timeout           |
//! | `[watch]`      | Settle delay, cooldown window, watched extensions|

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{PdfConfig, TemplatesConfig, WatchConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::log;
use crate::utils::path::normalize_path;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "docpress.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing docpress.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Template locations
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// PDF converter settings
    #[serde(default)]
    pub pdf: PdfConfig,

    /// Watch loop timing and filters
    #[serde(default)]
    pub watch: WatchConfig,
}

impl PressConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults, rooted at the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve config path `{}`", path.display()))?;

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            log!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.finalize(&root);
        config.validate()?;

        Ok(config)
    }

    /// Default configuration rooted at `root`.
    pub fn with_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.finalize(root);
        config
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "ignoring unknown fields in {}: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Set the root and make every configured path absolute.
    pub fn finalize(&mut self, root: &Path) {
        self.root = normalize_path(root);

        self.templates.dir = self.resolve_path(&self.templates.dir);
        self.templates.stylesheet = self.resolve_path(&self.templates.stylesheet);
        self.templates.assets = self.templates.assets.as_ref().map(|p| self.resolve_path(p));
    }

    /// Expand `~` and join relative paths onto the root.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        let raw = path.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());
        if expanded.is_absolute() {
            normalize_path(&expanded)
        } else {
            normalize_path(&self.root.join(expanded))
        }
    }

    /// Check values that would make the pipeline unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pdf.command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "[pdf] command must name a converter program".into(),
            ));
        }
        if self.pdf.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "[pdf] timeout_secs must be greater than zero".into(),
            ));
        }
        if self.watch.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "[watch] extensions must list at least one extension".into(),
            ));
        }
        Ok(())
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    pub fn template_dir(&self) -> &Path {
        &self.templates.dir
    }

    pub fn stylesheet(&self) -> &Path {
        &self.templates.stylesheet
    }

    /// Base directory for inlined assets and converter-side resolution.
    pub fn assets_dir(&self) -> &Path {
        self.templates.assets.as_deref().unwrap_or(&self.templates.dir)
    }
}

#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> PressConfig {
    PressConfig::from_str(content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_resolves_paths_against_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[templates]\ndir = \"forms\"\nstylesheet = \"./forms/../print.css\"\n")
            .unwrap();

        let config = PressConfig::load(&path).unwrap();
        let root = normalize_path(dir.path());
        assert_eq!(config.get_root(), root);
        assert_eq!(config.template_dir(), root.join("forms"));
        assert_eq!(config.stylesheet(), root.join("print.css"));
        assert_eq!(config.assets_dir(), root.join("forms"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PressConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.template_dir(), normalize_path(dir.path()).join("templates"));
        assert_eq!(config.watch.settle_ms, 1000);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let (config, ignored) =
            PressConfig::parse_with_ignored("[pdf]\ntimeout_secs = 5\ncolour = \"red\"\n").unwrap();
        assert_eq!(config.pdf.timeout_secs, 5);
        assert_eq!(ignored, vec!["pdf.colour".to_string()]);
    }

    #[test]
    fn test_validation_rejects_empty_command() {
        let config = test_parse_config("[pdf]\ncommand = []");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = test_parse_config("[pdf]\ntimeout_secs = 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(PressConfig::from_str("[pdf\n").is_err());
    }

    #[test]
    fn test_absolute_paths_kept() {
        let mut config = test_parse_config("[templates]\ndir = \"/srv/forms\"");
        config.finalize(Path::new("/project"));
        assert_eq!(config.template_dir(), Path::new("/srv/forms"));
        assert_eq!(config.stylesheet(), Path::new("/project/templates/shared.css"));
    }
}
