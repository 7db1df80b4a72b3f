//! Regeneration cache: remembers the latest successful request and replays it.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::debug;
use crate::error::Result;
use crate::pipeline::DocumentPipeline;
use crate::record::Renderable;

/// The last record/template pair that generated successfully.
pub struct Remembered {
    pub record: Arc<dyn Renderable>,
    pub id: String,
}

/// Pipeline wrapper that can re-run the most recent generation.
///
/// The slot is lock-free: the generating thread stores, the watch loop loads.
pub struct RegenerationCache {
    pipeline: Arc<DocumentPipeline>,
    last: ArcSwapOption<Remembered>,
}

impl RegenerationCache {
    pub fn new(pipeline: Arc<DocumentPipeline>) -> Self {
        Self {
            pipeline,
            last: ArcSwapOption::empty(),
        }
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Generate a document and remember the request if it succeeded.
    pub fn generate(&self, record: Arc<dyn Renderable>, id: &str) -> Result<Vec<u8>> {
        let bytes = self.pipeline.generate(record.as_ref(), id)?;
        self.remember(record, id);
        Ok(bytes)
    }

    /// Overwrite the remembered request.
    pub fn remember(&self, record: Arc<dyn Renderable>, id: &str) {
        debug!("regen"; "remembering {} ({})", id, record.shape());
        self.last.store(Some(Arc::new(Remembered {
            record,
            id: id.to_string(),
        })));
    }

    /// Re-run the remembered request against the current templates.
    ///
    /// `Ok(None)` when nothing has been remembered yet.
    pub fn replay(&self) -> Result<Option<Vec<u8>>> {
        let Some(last) = self.last.load_full() else {
            debug!("regen"; "nothing to replay");
            return Ok(None);
        };

        debug!("regen"; "replaying {}", last.id);
        self.pipeline.generate(last.record.as_ref(), &last.id).map(Some)
    }

    pub fn has_remembered(&self) -> bool {
        self.last.load().is_some()
    }

    /// Template id of the remembered request.
    pub fn remembered_id(&self) -> Option<String> {
        self.last.load_full().map(|last| last.id.clone())
    }
}
