//! Document pipeline.
//!
//! ```text
//! record + id ─► TemplateStore ─┬─ Static ────────► substitute ─┐
//!                               └─ Programmable ──► renderer  ──┤
//!                                                               ▼
//!                          inline_assets ─► inject_styles ─► Compositor ─► PDF
//! ```
//!
//! Every stage is synchronous; a pipeline is `Send + Sync` and can be shared
//! across threads behind an `Arc`.


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::PressConfig;
use crate::error::Result;
use crate::pdf::{CommandConverter, Compositor, PdfConverter};
use crate::record::Renderable;
use crate::template::{ProgrammableRenderer, TemplateKind, TemplateStore, substitute};
use crate::transform::{inject_styles, inline_assets};
use crate::{debug, log};

/// A generation request: the record and the template to render it with.
pub type Job = (Arc<dyn Renderable>, String);

pub struct DocumentPipeline {
    store: TemplateStore,
    renderer: ProgrammableRenderer,
    stylesheet: PathBuf,
    assets_dir: PathBuf,
    compositor: Compositor,
}

impl DocumentPipeline {
    pub fn new(
        template_dir: impl Into<PathBuf>,
        stylesheet: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
        converter: Arc<dyn PdfConverter>,
    ) -> Self {
        Self {
            store: TemplateStore::new(template_dir),
            renderer: ProgrammableRenderer::default(),
            stylesheet: stylesheet.into(),
            assets_dir: assets_dir.into(),
            compositor: Compositor::new(converter),
        }
    }

    /// Build a pipeline driving the configured external converter.
    pub fn from_config(config: &PressConfig) -> Result<Self> {
        let converter = CommandConverter::from_config(&config.pdf)?;
        Ok(Self::new(
            config.template_dir(),
            config.stylesheet(),
            config.assets_dir(),
            Arc::new(converter),
        ))
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn renderer(&self) -> &ProgrammableRenderer {
        &self.renderer
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Render `id` for `record` up to the final self-contained markup.
    pub fn render_markup(&self, record: &dyn Renderable, id: &str) -> Result<String> {
        let source = self.store.resolve(id)?;

        let markup = match source.kind {
            TemplateKind::Static => substitute(&source.text, record),
            TemplateKind::Programmable => self.renderer.render(id, &source.text, record)?,
        };
        debug!("render"; "{} ({}, {}) -> {} bytes", id, source.kind.label(), record.shape(), markup.len());

        let markup = inline_assets(&markup, &self.assets_dir);
        Ok(inject_styles(&markup, &self.stylesheet))
    }

    /// Run the whole pipeline and return PDF bytes.
    pub fn generate(&self, record: &dyn Renderable, id: &str) -> Result<Vec<u8>> {
        let start = Instant::now();
        let markup = self.render_markup(record, id)?;
        let bytes = self.compositor.compose(&markup, &self.assets_dir)?;
        debug!("pdf"; "{} via {} in {:?}", id, self.compositor.converter_name(), start.elapsed());
        Ok(bytes)
    }

    /// Generate independent documents in parallel.
    ///
    /// Results keep the order of `jobs`; one failure does not affect the rest.
    pub fn generate_batch(&self, jobs: &[Job]) -> Vec<Result<Vec<u8>>> {
        let results: Vec<_> = jobs
            .par_iter()
            .map(|(record, id)| self.generate(record.as_ref(), id))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log!("render"; "{} of {} documents failed", failed, jobs.len());
        }
        results
    }
}
