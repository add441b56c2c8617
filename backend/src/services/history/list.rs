use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /api/history`: remembered values per field id, most recent
/// first.
pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.store.history()?))
}
