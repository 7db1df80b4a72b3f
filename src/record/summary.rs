//! Visit summary record, addressed with `{{field}}` tokens.

use serde::{Deserialize, Serialize};

use super::{PresentationField, Renderable, serialize_context};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitSummary {
    pub patient_name: Option<String>,
    pub visit_date: Option<String>,
    pub provider: Option<String>,
    pub clinic_name: Option<String>,
    pub chief_complaint: Option<String>,
    pub findings: Option<String>,
    pub treatment: Option<String>,
    pub follow_up: Option<String>,
    pub notes: Option<String>,
}

impl Renderable for VisitSummary {
    fn shape(&self) -> &'static str {
        "visit-summary"
    }

    fn presentation_fields(&self) -> Vec<PresentationField> {
        use PresentationField as F;

        vec![
            F::text("{{patient_name}}", self.patient_name.as_deref()),
            F::text("{{visit_date}}", self.visit_date.as_deref()),
            F::text("{{provider}}", self.provider.as_deref()),
            F::text("{{clinic_name}}", self.clinic_name.as_deref()),
            F::text("{{chief_complaint}}", self.chief_complaint.as_deref()),
            F::text("{{findings}}", self.findings.as_deref()),
            F::text("{{treatment}}", self.treatment.as_deref()),
            F::text("{{follow_up}}", self.follow_up.as_deref()),
            F::text("{{notes}}", self.notes.as_deref()),
        ]
    }

    fn template_context(&self) -> minijinja::Value {
        serialize_context(self)
    }
}
