use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /api/form/config`.
///
/// # Returns
/// - `200 OK` with the stored `FormConfig` as JSON.
/// - `500 Internal Server Error` if the store cannot be read.
pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let config = state.store.load_config()?;
    Ok(HttpResponse::Ok().json(config))
}
