//! Programmable templates compiled with `minijinja`.
//!
//! Each identifier compiles into its own environment, so a broken template
//! can never disturb the units of other identifiers. A unit remembers the
//! fingerprint of the source it was built from and the record shape it was
//! built for; a render with different source or shape re-registers the id.

use std::sync::Arc;

use dashmap::DashMap;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use super::PROGRAMMABLE_SUFFIXES;
use crate::debug;
use crate::error::{PipelineError, Result};
use crate::record::Renderable;

/// One compiled template.
pub struct CompiledUnit {
    env: Environment<'static>,
    shape: &'static str,
    fingerprint: blake3::Hash,
}

impl CompiledUnit {
    fn compile(id: &str, text: &str, shape: &'static str) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(auto_escape_for);
        env.add_template_owned(id.to_string(), text.to_string())
            .map_err(|e| PipelineError::compile(id, e))?;

        Ok(Self {
            env,
            shape,
            fingerprint: blake3::hash(text.as_bytes()),
        })
    }

    fn is_current(&self, shape: &str, fingerprint: &blake3::Hash) -> bool {
        self.shape == shape && self.fingerprint == *fingerprint
    }

    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// Short hex fingerprint of the compiled source.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.fingerprint.as_bytes()[..8])
    }

    fn render(&self, id: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(id)
            .and_then(|template| template.render(ctx))
            .map_err(|e| PipelineError::render(id, e))
    }
}

/// Pick HTML escaping for `*.html.j2` style names.
fn auto_escape_for(name: &str) -> AutoEscape {
    let lower = name.to_ascii_lowercase();
    let base = PROGRAMMABLE_SUFFIXES
        .iter()
        .find_map(|s| lower.strip_suffix(s))
        .unwrap_or(&lower);
    match base.rsplit('.').next() {
        Some("html" | "htm" | "xml" | "xhtml") => AutoEscape::Html,
        _ => AutoEscape::None,
    }
}

/// Compiled units keyed by template identifier.
///
/// Read-mostly: writers only appear on a compile miss. Entries are replaced
/// on re-registration and never evicted.
#[derive(Default)]
pub struct CompiledTemplateCache {
    units: DashMap<String, Arc<CompiledUnit>>,
}

impl CompiledTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<CompiledUnit>> {
        self.units.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn insert(&self, id: &str, unit: Arc<CompiledUnit>) {
        self.units.insert(id.to_string(), unit);
    }
}

/// Renders programmable templates, compiling through a shared cache.
#[derive(Clone, Default)]
pub struct ProgrammableRenderer {
    cache: Arc<CompiledTemplateCache>,
}

impl ProgrammableRenderer {
    pub fn new(cache: Arc<CompiledTemplateCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CompiledTemplateCache {
        &self.cache
    }

    /// Compile `text` and store it under `id`, replacing any previous unit.
    ///
    /// On failure the cache is left exactly as it was.
    pub fn register(&self, id: &str, text: &str, shape: &'static str) -> Result<Arc<CompiledUnit>> {
        let unit = Arc::new(CompiledUnit::compile(id, text, shape)?);
        debug!("render"; "compiled {} for {} ({})", id, shape, unit.fingerprint());
        self.cache.insert(id, Arc::clone(&unit));
        Ok(unit)
    }

    /// Render `text` registered as `id` against `record`.
    pub fn render(&self, id: &str, text: &str, record: &dyn Renderable) -> Result<String> {
        let shape = record.shape();
        let fingerprint = blake3::hash(text.as_bytes());

        let unit = match self.cache.get(id) {
            Some(unit) if unit.is_current(shape, &fingerprint) => unit,
            _ => self.register(id, text, shape)?,
        };

        unit.render(id, record.template_context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CariesRiskAssessment, PatientInfo, VisitSummary};

    fn summary() -> VisitSummary {
        VisitSummary {
            patient_name: Some("Ada".into()),
            provider: Some("Dr. <Who>".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_and_cache() {
        let renderer = ProgrammableRenderer::default();
        let out = renderer
            .render("s.html.j2", "<p>{{ patient_name }}</p>", &summary())
            .unwrap();
        assert_eq!(out, "<p>Ada</p>");
        assert!(renderer.cache().contains("s.html.j2"));
        assert_eq!(renderer.cache().len(), 1);
    }

    #[test]
    fn test_unchanged_source_reuses_unit() {
        let renderer = ProgrammableRenderer::default();
        let text = "{{ patient_name }}";
        renderer.render("s.html.j2", text, &summary()).unwrap();
        let first = renderer.cache().get("s.html.j2").unwrap();
        renderer.render("s.html.j2", text, &summary()).unwrap();
        let second = renderer.cache().get("s.html.j2").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_edited_source_replaces_unit() {
        let renderer = ProgrammableRenderer::default();
        renderer.render("s.html.j2", "v1 {{ patient_name }}", &summary()).unwrap();
        let out = renderer
            .render("s.html.j2", "v2 {{ patient_name }}", &summary())
            .unwrap();
        assert_eq!(out, "v2 Ada");
        assert_eq!(renderer.cache().len(), 1);
    }

    #[test]
    fn test_register_is_last_write_wins() {
        let renderer = ProgrammableRenderer::default();
        renderer.register("x.j2", "one", "visit-summary").unwrap();
        let old = renderer.cache().get("x.j2").unwrap();
        renderer.register("x.j2", "two", "visit-summary").unwrap();
        let new = renderer.cache().get("x.j2").unwrap();
        assert!(!Arc::ptr_eq(&old, &new));
    }

    #[test]
    fn test_html_auto_escape() {
        let renderer = ProgrammableRenderer::default();
        let out = renderer
            .render("s.html.jinja", "{{ provider }}", &summary())
            .unwrap();
        assert_eq!(out, "Dr. &lt;Who&gt;");

        let out = renderer.render("s.txt.j2", "{{ provider }}", &summary()).unwrap();
        assert_eq!(out, "Dr. <Who>");
    }

    #[test]
    fn test_nested_sections() {
        let renderer = ProgrammableRenderer::default();
        let rec = CariesRiskAssessment {
            patient: Some(PatientInfo {
                name: Some("Ada".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = renderer
            .render(
                "a.html.j2",
                "{{ Patient.Name }}{% if RiskFactors %}!{% endif %}",
                &rec,
            )
            .unwrap();
        assert_eq!(out, "Ada");
    }

    #[test]
    fn test_compile_error_carries_diagnostic() {
        let renderer = ProgrammableRenderer::default();
        let err = renderer
            .render("bad.html.j2", "{% if %}", &summary())
            .unwrap_err();
        match err {
            PipelineError::Compile { id, diagnostic, .. } => {
                assert_eq!(id, "bad.html.j2");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert!(!renderer.cache().contains("bad.html.j2"));
    }

    #[test]
    fn test_compile_error_isolated_from_other_ids() {
        let renderer = ProgrammableRenderer::default();
        renderer.render("good.html.j2", "{{ patient_name }}", &summary()).unwrap();
        let before = renderer.cache().get("good.html.j2").unwrap();

        assert!(renderer.render("bad.html.j2", "{{ unclosed", &summary()).is_err());

        let after = renderer.cache().get("good.html.j2").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(
            renderer.render("good.html.j2", "{{ patient_name }}", &summary()).unwrap(),
            "Ada"
        );
    }

    #[test]
    fn test_missing_field_is_render_error() {
        let renderer = ProgrammableRenderer::default();
        let err = renderer
            .render("s.html.j2", "{{ no_such_field }}", &summary())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Render { .. }), "{err:?}");
    }

    #[test]
    fn test_shape_change_recompiles() {
        let renderer = ProgrammableRenderer::default();
        let text = "{{ record is defined }}";
        renderer.render("t.j2", text, &summary()).unwrap();
        assert_eq!(renderer.cache().get("t.j2").unwrap().shape(), "visit-summary");
        renderer
            .render("t.j2", text, &CariesRiskAssessment::default())
            .unwrap();
        assert_eq!(
            renderer.cache().get("t.j2").unwrap().shape(),
            "caries-risk-assessment"
        );
    }
}
