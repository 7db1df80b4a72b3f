//! Template resolution and the two rendering strategies.
//!
//! # Module Structure
//!
//! ```text
//! template/
//! ├── store          # TemplateStore: id -> (text, kind), always re-read
//! ├── substitute     # Static templates: literal token replacement
//! └── programmable   # Programmable templates: minijinja + compiled cache
//! ```

mod programmable;
mod store;
mod substitute;

pub use programmable::{CompiledTemplateCache, ProgrammableRenderer};
pub use store::TemplateStore;
pub use substitute::substitute;

use std::path::PathBuf;

/// File suffixes marking a programmable template.
const PROGRAMMABLE_SUFFIXES: &[&str] = &[".j2", ".jinja", ".jinja2"];

/// How a template is turned into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Markup with literal tokens, rewritten by [`substitute`].
    Static,
    /// Template source compiled by [`ProgrammableRenderer`].
    Programmable,
}

impl TemplateKind {
    /// Classify a template identifier by its naming convention.
    pub fn from_id(id: &str) -> Self {
        let lower = id.to_ascii_lowercase();
        if PROGRAMMABLE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Self::Programmable
        } else {
            Self::Static
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Programmable => "programmable",
        }
    }
}

/// A resolved template.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub id: String,
    pub path: PathBuf,
    pub text: String,
    pub kind: TemplateKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_id() {
        assert_eq!(TemplateKind::from_id("caries_risk.html"), TemplateKind::Static);
        assert_eq!(TemplateKind::from_id("summary.htm"), TemplateKind::Static);
        assert_eq!(
            TemplateKind::from_id("summary.html.j2"),
            TemplateKind::Programmable
        );
        assert_eq!(
            TemplateKind::from_id("forms/Summary.JINJA"),
            TemplateKind::Programmable
        );
        assert_eq!(
            TemplateKind::from_id("letter.jinja2"),
            TemplateKind::Programmable
        );
    }
}
