use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::FieldDefinition;

/// Actix web handler for `POST /api/settings/fields`.
///
/// A blank `id` is replaced by a generated UUID.
///
/// # Arguments
/// * `payload` - The new `FieldDefinition`.
///
/// # Returns
/// - `200 OK` with the refreshed `FormConfig`.
/// - `400 Bad Request` if the field is invalid, `409 Conflict` if its id is taken.
pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<FieldDefinition>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.create_field(payload.into_inner())?;
    Ok(HttpResponse::Ok().json(config))
}

/// Actix web handler for `PUT /api/settings/fields/{id}`.
///
/// # Arguments
/// * `id` - The field to replace, extracted from the URL path.
/// * `payload` - The new definition; its `id` may differ from the path.
///
/// # Returns
/// - `200 OK` with the refreshed `FormConfig`.
/// - `404 Not Found` if no field has that id.
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<FieldDefinition>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.update_field(&id, payload.into_inner())?;
    Ok(HttpResponse::Ok().json(config))
}

/// Actix web handler for `DELETE /api/settings/fields/{id}`. Deleting an absent field is
/// not an error; the field's value history goes with it.
pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.delete_field(&id)?;
    Ok(HttpResponse::Ok().json(config))
}
