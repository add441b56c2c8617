use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use log::debug;

/// Actix web handler for `GET /api/settings/templates/files`.
///
/// # Returns
/// - `200 OK` with the sorted `.docx` / `.xlsx` names in the templates directory.
pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let files = state.storage.list()?;
    debug!("{} template files in {}", files.len(), state.storage.dir().display());
    Ok(HttpResponse::Ok().json(files))
}
