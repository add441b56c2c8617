use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::availability::check_availability;
use common::model::FormValues;
use log::debug;

/// Actix web handler for `POST /api/form/availability`.
///
/// Formulas are recomputed first, so a required formula field counts as filled when its
/// computed value is non-blank.
///
/// # Arguments
/// * `payload` - The form values, keyed by placeholder.
///
/// # Returns
/// - `200 OK` with `{availableTemplates, allTemplates}`.
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<FormValues>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.load_config()?;
    let response = check_availability(&config, &payload);
    debug!(
        "{} of {} templates available",
        response.available_templates.len(),
        response.all_templates.len()
    );
    Ok(HttpResponse::Ok().json(response))
}
