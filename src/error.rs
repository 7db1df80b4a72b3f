//! Pipeline error taxonomy.
//!
//! | Variant      | Fatal to request | Raised by                          |
//! |--------------|------------------|------------------------------------|
//! | `NotFound`   | yes (store)      | template store                     |
//! | `Compile`    | yes              | programmable renderer              |
//! | `Render`     | yes              | programmable renderer              |
//! | `Conversion` | yes              | PDF compositor                     |
//! | `Io`         | yes (store)      | template store, record loading     |
//!
//! Asset inlining and style injection never return these: a missing image
//! or stylesheet is logged and the markup passes through unchanged.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("template `{id}` not found at `{}`", .path.display())]
    NotFound { id: String, path: PathBuf },

    #[error("failed to compile template `{id}`: {diagnostic}")]
    Compile {
        id: String,
        diagnostic: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template `{id}`: {diagnostic}")]
    Render {
        id: String,
        diagnostic: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl PipelineError {
    pub(crate) fn compile(id: &str, source: minijinja::Error) -> Self {
        Self::Compile {
            id: id.to_string(),
            diagnostic: describe(&source),
            source,
        }
    }

    pub(crate) fn render(id: &str, source: minijinja::Error) -> Self {
        Self::Render {
            id: id.to_string(),
            diagnostic: describe(&source),
            source,
        }
    }

    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not-found",
            Self::Compile { .. } => "compile",
            Self::Render { .. } => "render",
            Self::Conversion(_) => "conversion",
            Self::Io(..) => "io",
        }
    }
}

/// Flatten a minijinja error with its line number and detail.
fn describe(err: &minijinja::Error) -> String {
    let mut out = err.kind().to_string();
    if let Some(detail) = err.detail() {
        out.push_str(": ");
        out.push_str(detail);
    }
    if let Some(line) = err.line() {
        out.push_str(&format!(" (line {line})"));
    }
    out
}
