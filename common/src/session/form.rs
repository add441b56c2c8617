use super::selection::{file_count_label, ArchiveSelection, AvailabilitySet, FormatFlags};
use crate::formula::ERROR_SENTINEL;
use crate::model::values::{is_blank, merge_values};
use crate::model::{ComputedValues, FormValues, TemplateDefinition};
use crate::responses::AvailabilityResponse;

/// Last availability answer from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityView {
    pub all_templates: Vec<TemplateDefinition>,
    pub available: AvailabilitySet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaDisplay {
    NotComputed,
    Value(String),
    Error,
}

/// State of the per-template controls of the availability view.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateControl {
    pub template: TemplateDefinition,
    pub available: bool,
    pub selected: FormatFlags,
}

/// State of the bulk export control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveControl {
    pub visible: bool,
    pub enabled: bool,
    pub file_count: usize,
    pub label: String,
}

/// Values entered in the form, the formulas computed from them and the availability view
/// with its archive selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FormValues,
    pub computed: ComputedValues,
    pub availability: Option<AvailabilityView>,
    pub selection: ArchiveSelection,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the raw value, empty strings included.
    pub fn set_value(&mut self, placeholder: &str, raw: &str) {
        self.values.insert(placeholder.to_string(), raw.to_string());
    }

    pub fn merged(&self) -> FormValues {
        merge_values(&self.values, &self.computed)
    }

    pub fn apply_computed(&mut self, computed: ComputedValues) {
        self.computed = computed;
    }

    pub fn is_submittable(&self) -> bool {
        self.values.values().any(|value| !is_blank(value))
    }

    /// Replaces the availability view and drops selected templates that are no longer
    /// available. Returns the dropped ids.
    pub fn apply_availability(&mut self, response: AvailabilityResponse) -> Vec<String> {
        let available = AvailabilitySet::from_templates(&response.available_templates);
        let evicted = self.selection.reconcile(&available);
        self.availability = Some(AvailabilityView {
            all_templates: response.all_templates,
            available,
        });
        evicted
    }

    pub fn is_available(&self, template_id: &str) -> bool {
        self.availability
            .as_ref()
            .is_some_and(|view| view.available.contains(template_id))
    }

    /// Updates the archive flags of an available template. Returns false, leaving the
    /// selection untouched, for a template that is not available.
    pub fn toggle_selection(&mut self, template_id: &str, original: bool, pdf: bool) -> bool {
        if !self.is_available(template_id) {
            return false;
        }
        self.selection.toggle(template_id, original, pdf);
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.computed.clear();
        self.availability = None;
        self.selection.clear();
    }

    pub fn formula_display(&self, placeholder: &str) -> FormulaDisplay {
        match self.computed.get(placeholder) {
            None => FormulaDisplay::NotComputed,
            Some(value) if value == ERROR_SENTINEL => FormulaDisplay::Error,
            Some(value) => FormulaDisplay::Value(value.clone()),
        }
    }

    /// One control per catalog template, in catalog order. Empty while no availability
    /// view is shown.
    pub fn template_controls(&self) -> Vec<TemplateControl> {
        let Some(view) = &self.availability else {
            return Vec::new();
        };
        view.all_templates
            .iter()
            .map(|template| TemplateControl {
                available: view.available.contains(&template.id),
                selected: self.selection.flags(&template.id),
                template: template.clone(),
            })
            .collect()
    }

    pub fn archive_control(&self) -> ArchiveControl {
        let file_count = self.selection.file_count();
        ArchiveControl {
            visible: self
                .availability
                .as_ref()
                .is_some_and(|view| !view.available.is_empty()),
            enabled: file_count > 0,
            file_count,
            label: file_count_label(file_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str) -> TemplateDefinition {
        TemplateDefinition {
            id: id.to_string(),
            display_name: id.to_string(),
            file_name: format!("{id}.docx"),
            download_pattern: String::new(),
            required_field_ids: vec!["A".to_string()],
        }
    }

    fn response(available: &[&str], all: &[&str]) -> AvailabilityResponse {
        AvailabilityResponse {
            available_templates: available.iter().map(|id| template(id)).collect(),
            all_templates: all.iter().map(|id| template(id)).collect(),
        }
    }

    #[test]
    fn losing_availability_empties_the_selection() {
        let mut state = FormState::new();
        state.set_value("A", "3");
        state.apply_availability(response(&["T"], &["T", "U"]));
        assert!(state.toggle_selection("T", true, false));
        assert_eq!(state.archive_control().file_count, 1);

        state.set_value("A", "");
        let evicted = state.apply_availability(response(&[], &["T", "U"]));

        assert_eq!(evicted, ["T"]);
        assert!(state.selection.is_empty());
        let control = state.archive_control();
        assert_eq!(control.file_count, 0);
        assert!(!control.enabled);
        assert!(!control.visible);
    }

    #[test]
    fn unavailable_templates_cannot_be_selected() {
        let mut state = FormState::new();
        assert!(!state.toggle_selection("T", true, true));

        state.apply_availability(response(&["T"], &["T", "U"]));
        assert!(!state.toggle_selection("U", true, false));
        assert!(state.selection.is_empty());

        let controls = state.template_controls();
        assert_eq!(controls.len(), 2);
        assert!(controls[0].available);
        assert!(!controls[1].available);
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = FormState::new();
        state.set_value("A", "3");
        let mut computed = ComputedValues::new();
        computed.insert("B".to_string(), "6.00".to_string());
        state.apply_computed(computed);
        state.apply_availability(response(&["T"], &["T"]));
        state.toggle_selection("T", true, true);

        state.clear();

        assert!(state.values.is_empty());
        assert!(state.computed.is_empty());
        assert!(state.availability.is_none());
        assert!(state.selection.is_empty());
        assert!(!state.is_submittable());
        assert_eq!(state.formula_display("B"), FormulaDisplay::NotComputed);
        assert!(state.template_controls().is_empty());
    }

    #[test]
    fn formula_display_states() {
        let mut state = FormState::new();
        let mut computed = ComputedValues::new();
        computed.insert("B".to_string(), "6.00".to_string());
        computed.insert("C".to_string(), ERROR_SENTINEL.to_string());
        state.apply_computed(computed);

        assert_eq!(state.formula_display("B"), FormulaDisplay::Value("6.00".to_string()));
        assert_eq!(state.formula_display("C"), FormulaDisplay::Error);
        assert_eq!(state.formula_display("D"), FormulaDisplay::NotComputed);
    }

    #[test]
    fn blank_values_are_not_submittable() {
        let mut state = FormState::new();
        state.set_value("A", "  ");
        assert!(!state.is_submittable());
        assert_eq!(state.values.get("A").map(String::as_str), Some("  "));
        state.set_value("B", "x");
        assert!(state.is_submittable());
    }
}
