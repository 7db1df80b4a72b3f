use std::path::{Path, PathBuf};

use super::{TemplateKind, TemplateSource};
use crate::debug;
use crate::error::{PipelineError, Result};
use crate::utils::path::is_contained;

/// Resolves template identifiers to files under a root directory.
///
/// Raw text is never cached: every `resolve` reads the file again so an
/// edit is visible to the next render.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an identifier maps to. Identifiers escaping the root have none.
    pub fn path_of(&self, id: &str) -> Option<PathBuf> {
        let relative = Path::new(id);
        is_contained(relative).then(|| self.root.join(relative))
    }

    /// Read the template named by `id`.
    pub fn resolve(&self, id: &str) -> Result<TemplateSource> {
        let not_found = |path: PathBuf| PipelineError::NotFound {
            id: id.to_string(),
            path,
        };

        let path = self
            .path_of(id)
            .ok_or_else(|| not_found(self.root.join(id)))?;

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found(path));
            }
            Err(err) => return Err(PipelineError::Io(path, err)),
        };

        let kind = TemplateKind::from_id(id);
        debug!("store"; "resolved {} ({}, {} bytes)", id, kind.label(), text.len());

        Ok(TemplateSource {
            id: id.to_string(),
            path,
            text,
            kind,
        })
    }
}
