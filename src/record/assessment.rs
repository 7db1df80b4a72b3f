//! Pediatric caries-risk assessment record.
//!
//! Static templates address this shape with two token syntaxes:
//! `[[NAME]]` for text fields and `[[NAME_CLASS]]` for checkbox-like
//! fields resolved to a presentation class.

use serde::{Deserialize, Serialize};

use super::{FlagValue, PresentationField, Renderable, serialize_context};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CariesRiskAssessment {
    pub patient: Option<PatientInfo>,
    pub risk_factors: Option<RiskFactors>,
    pub protective_factors: Option<ProtectiveFactors>,
    pub clinical_findings: Option<ClinicalFindings>,
    /// `"Low"`, `"Moderate"` or `"High"`.
    pub overall_risk: Option<String>,
    pub recommendations: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub medical_record_number: Option<String>,
    pub assessment_date: Option<String>,
    pub examiner: Option<String>,
    pub clinic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RiskFactors {
    pub bottle_usage: Option<FlagValue>,
    pub frequent_snacking: Option<FlagValue>,
    pub sugary_drinks: Option<FlagValue>,
    pub caregiver_caries: Option<FlagValue>,
    pub special_health_needs: Option<FlagValue>,
    pub low_socioeconomic_status: Option<FlagValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProtectiveFactors {
    pub fluoridated_water: Option<FlagValue>,
    pub fluoride_toothpaste: Option<FlagValue>,
    pub dental_home: Option<FlagValue>,
    pub fluoride_varnish: Option<FlagValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClinicalFindings {
    pub white_spot_lesions: Option<FlagValue>,
    pub cavitated_lesions: Option<FlagValue>,
    pub visible_plaque: Option<FlagValue>,
    pub existing_restorations: Option<FlagValue>,
}

impl CariesRiskAssessment {
    /// Checkbox for one of the three risk levels, derived from `OverallRisk`.
    fn risk_level(&self, level: &str) -> Option<FlagValue> {
        let risk = self.overall_risk.as_deref()?;
        Some(FlagValue::Bool(risk.trim().eq_ignore_ascii_case(level)))
    }
}

impl Renderable for CariesRiskAssessment {
    fn shape(&self) -> &'static str {
        "caries-risk-assessment"
    }

    fn presentation_fields(&self) -> Vec<PresentationField> {
        use PresentationField as F;

        let patient = self.patient.as_ref();
        let risk = self.risk_factors.as_ref();
        let protective = self.protective_factors.as_ref();
        let clinical = self.clinical_findings.as_ref();

        vec![
            // Patient
            F::text("[[PATIENT_NAME]]", patient.and_then(|p| p.name.as_deref())),
            F::text("[[DATE_OF_BIRTH]]", patient.and_then(|p| p.date_of_birth.as_deref())),
            F::text("[[MRN]]", patient.and_then(|p| p.medical_record_number.as_deref())),
            F::text("[[ASSESSMENT_DATE]]", patient.and_then(|p| p.assessment_date.as_deref())),
            F::text("[[EXAMINER]]", patient.and_then(|p| p.examiner.as_deref())),
            F::text("[[CLINIC_NAME]]", patient.and_then(|p| p.clinic.as_deref())),
            // Risk factors
            F::class("[[BOTTLE_USAGE_CLASS]]", risk.and_then(|r| r.bottle_usage.as_ref())),
            F::class("[[FREQUENT_SNACKING_CLASS]]", risk.and_then(|r| r.frequent_snacking.as_ref())),
            F::class("[[SUGARY_DRINKS_CLASS]]", risk.and_then(|r| r.sugary_drinks.as_ref())),
            F::class("[[CAREGIVER_CARIES_CLASS]]", risk.and_then(|r| r.caregiver_caries.as_ref())),
            F::class("[[SPECIAL_HEALTH_NEEDS_CLASS]]", risk.and_then(|r| r.special_health_needs.as_ref())),
            F::class("[[LOW_SES_CLASS]]", risk.and_then(|r| r.low_socioeconomic_status.as_ref())),
            // Protective factors
            F::class("[[FLUORIDATED_WATER_CLASS]]", protective.and_then(|p| p.fluoridated_water.as_ref())),
            F::class("[[FLUORIDE_TOOTHPASTE_CLASS]]", protective.and_then(|p| p.fluoride_toothpaste.as_ref())),
            F::class("[[DENTAL_HOME_CLASS]]", protective.and_then(|p| p.dental_home.as_ref())),
            F::class("[[FLUORIDE_VARNISH_CLASS]]", protective.and_then(|p| p.fluoride_varnish.as_ref())),
            // Clinical findings
            F::class("[[WHITE_SPOT_LESIONS_CLASS]]", clinical.and_then(|c| c.white_spot_lesions.as_ref())),
            F::class("[[CAVITATED_LESIONS_CLASS]]", clinical.and_then(|c| c.cavitated_lesions.as_ref())),
            F::class("[[VISIBLE_PLAQUE_CLASS]]", clinical.and_then(|c| c.visible_plaque.as_ref())),
            F::class("[[EXISTING_RESTORATIONS_CLASS]]", clinical.and_then(|c| c.existing_restorations.as_ref())),
            // Summary
            F::text("[[OVERALL_RISK]]", self.overall_risk.as_deref()),
            F::class("[[RISK_LOW_CLASS]]", self.risk_level("low").as_ref()),
            F::class("[[RISK_MODERATE_CLASS]]", self.risk_level("moderate").as_ref()),
            F::class("[[RISK_HIGH_CLASS]]", self.risk_level("high").as_ref()),
            F::text("[[RECOMMENDATIONS]]", self.recommendations.as_deref()),
            F::text("[[NOTES]]", self.notes.as_deref()),
        ]
    }

    fn template_context(&self) -> minijinja::Value {
        serialize_context(self)
    }
}
