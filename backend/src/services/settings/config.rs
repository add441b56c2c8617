use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::FormConfig;

/// Actix web handler for `GET /api/settings/config`.
pub async fn get(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.store.load_config()?))
}

/// Actix web handler for `PUT /api/settings/config`.
///
/// # Arguments
/// * `payload` - The complete new `FormConfig`; it replaces every field and template.
///
/// # Returns
/// - `200 OK` with the stored configuration.
/// - `400 Bad Request` if the configuration fails validation.
pub async fn replace(
    state: web::Data<AppState>,
    payload: web::Json<FormConfig>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.replace_config(&payload)?;
    Ok(HttpResponse::Ok().json(config))
}
