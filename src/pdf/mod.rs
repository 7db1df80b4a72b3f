//! PDF composition boundary.
//!
//! The pipeline hands self-contained markup to a [`PdfConverter`] and gets
//! PDF bytes back. [`CommandConverter`] drives an external HTML→PDF tool;
//! tests and embedders can plug in their own converter.

mod command;

pub use command::CommandConverter;

use std::path::Path;
use std::sync::Arc;

use crate::debug;
use crate::error::{PipelineError, Result};

/// Magic bytes every PDF starts with.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// HTML/CSS → PDF conversion.
pub trait PdfConverter: Send + Sync {
    /// Human-readable converter name for logs.
    fn name(&self) -> &str;

    /// Convert `markup` to PDF bytes. Relative references still present in
    /// the markup resolve against `base_dir`.
    fn convert(&self, markup: &str, base_dir: &Path) -> Result<Vec<u8>>;
}

/// Final pipeline stage: markup in, checked PDF bytes out.
#[derive(Clone)]
pub struct Compositor {
    converter: Arc<dyn PdfConverter>,
}

impl Compositor {
    pub fn new(converter: Arc<dyn PdfConverter>) -> Self {
        Self { converter }
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }

    pub fn compose(&self, markup: &str, base_dir: &Path) -> Result<Vec<u8>> {
        let bytes = self.converter.convert(markup, base_dir)?;

        if bytes.is_empty() {
            return Err(PipelineError::Conversion(format!(
                "`{}` produced no output",
                self.converter.name()
            )));
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(PipelineError::Conversion(format!(
                "`{}` output is not a PDF document",
                self.converter.name()
            )));
        }

        debug!("pdf"; "{} produced {} bytes", self.converter.name(), bytes.len());
        Ok(bytes)
    }
}
