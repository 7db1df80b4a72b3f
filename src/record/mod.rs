//! Data records and the `Renderable` capability.
//!
//! A record shape exposes two views of itself:
//!
//! - `presentation_fields()`: ordered `token → value` pairs consumed by the
//!   placeholder substitution engine (static templates)
//! - `template_context()`: a `minijinja` value for programmable templates
//!
//! The pipeline never branches on the concrete record type. Supporting a new
//! shape means implementing this trait; supporting a new token means adding a
//! row to that shape's field table.

mod assessment;
mod flag;
mod summary;

pub use assessment::{
    CariesRiskAssessment, ClinicalFindings, PatientInfo, ProtectiveFactors, RiskFactors,
};
pub use flag::{FlagValue, PresentationClass, presentation_class};
pub use summary::VisitSummary;

use serde::Serialize;
use std::sync::Arc;

use crate::utils::html;

/// Capability shared by every record shape the pipeline can render.
pub trait Renderable: Send + Sync {
    /// Stable shape name, used to key compiled programmable templates.
    fn shape(&self) -> &'static str;

    /// Ordered literal-token replacements for static templates.
    fn presentation_fields(&self) -> Vec<PresentationField>;

    /// Evaluation context for programmable templates.
    fn template_context(&self) -> minijinja::Value;
}

/// One literal token and the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationField {
    pub token: &'static str,
    pub value: String,
}

impl PresentationField {
    /// A text field; absent values become the empty string.
    pub fn text(token: &'static str, value: Option<&str>) -> Self {
        Self {
            token,
            value: value.map(|v| html::escape(v).into_owned()).unwrap_or_default(),
        }
    }

    /// A checkbox-like field resolved through [`presentation_class`].
    pub fn class(token: &'static str, raw: Option<&FlagValue>) -> Self {
        Self {
            token,
            value: presentation_class(raw).as_str().to_string(),
        }
    }
}

/// Build a programmable-template context from a serializable record.
///
/// Top-level fields are reachable directly (`{{ Patient.Name }}`) and the
/// whole record again under `record`.
pub fn serialize_context<T: Serialize>(record: &T) -> minijinja::Value {
    let value = serde_json::to_value(record).unwrap_or(serde_json::Value::Null);
    let mut ctx = match &value {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    ctx.insert("record".to_string(), value);
    minijinja::Value::from_serialize(&ctx)
}

/// Record shapes accepted from JSON files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordShape {
    /// `CariesRiskAssessment` (bracket and class tokens)
    Assessment,
    /// `VisitSummary` (double-brace tokens)
    VisitSummary,
}

impl RecordShape {
    /// Deserialize a record of this shape from JSON text.
    pub fn from_json(self, text: &str) -> serde_json::Result<Arc<dyn Renderable>> {
        Ok(match self {
            Self::Assessment => Arc::new(serde_json::from_str::<CariesRiskAssessment>(text)?),
            Self::VisitSummary => Arc::new(serde_json::from_str::<VisitSummary>(text)?),
        })
    }
}
