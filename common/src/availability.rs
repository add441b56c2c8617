//! Which templates can be generated from the values entered so far.

use crate::formula;
use crate::model::values::{is_blank, merge_values, resolve, FormValues};
use crate::model::{FieldDefinition, FormConfig, TemplateDefinition};
use crate::responses::AvailabilityResponse;

/// A template is available when every required field id names a defined field whose
/// placeholder has a non-blank value. A required id that names no field can never be
/// satisfied.
pub fn is_template_available(
    template: &TemplateDefinition,
    fields: &[FieldDefinition],
    values: &FormValues,
) -> bool {
    template.required_field_ids.iter().all(|field_id| {
        fields
            .iter()
            .find(|field| &field.id == field_id)
            .and_then(|field| resolve(values, &field.placeholder))
            .is_some_and(|value| !is_blank(value))
    })
}

/// Server-side availability check: formulas are recomputed first so that a required
/// formula field is satisfied by its computed value.
pub fn check_availability(config: &FormConfig, values: &FormValues) -> AvailabilityResponse {
    let computed = formula::evaluate_all(&config.fields, values);
    let merged = merge_values(values, &computed);

    let available_templates = config
        .templates
        .iter()
        .filter(|template| is_template_available(template, &config.fields, &merged))
        .cloned()
        .collect();

    AvailabilityResponse {
        available_templates,
        all_templates: config.templates.clone(),
    }
}
