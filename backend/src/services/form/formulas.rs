use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::formula;
use common::model::{ComputedValues, FormValues};

/// Actix web handler for `POST /api/form/formulas`.
///
/// # Arguments
/// * `payload` - The form values, keyed by placeholder.
///
/// # Returns
/// - `200 OK` with placeholder → formatted result for every formula field. A formula that
///   cannot be evaluated maps to `ERROR`.
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<FormValues>,
) -> Result<HttpResponse, ApiError> {
    let computed = calculate(&state, &payload)?;
    Ok(HttpResponse::Ok().json(computed))
}

fn calculate(state: &AppState, values: &FormValues) -> Result<ComputedValues, ApiError> {
    let config = state.store.load_config()?;
    Ok(formula::evaluate_all(&config.fields, values))
}
