//! docpress: data records + HTML templates → self-contained markup → PDF.
//!
//! ```ignore
//! let pipeline = DocumentPipeline::from_config(&PressConfig::load(path)?)?;
//! let pdf = pipeline.generate(&record, "caries_risk.html")?;
//! ```

pub mod logger;

pub mod config;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod record;
pub mod regen;
pub mod template;
pub mod transform;
pub mod utils;
pub mod watch;

pub use error::{PipelineError, Result};
pub use pipeline::DocumentPipeline;
pub use record::{Renderable, RecordShape};
pub use regen::RegenerationCache;
