use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::{FormConfig, TemplateDefinition};
use log::warn;

/// Actix web handler for `POST /api/settings/templates`.
///
/// # Arguments
/// * `payload` - The new `TemplateDefinition`.
///
/// # Returns
/// - `200 OK` with the refreshed `FormConfig`.
/// - `400 Bad Request` if the template is invalid, `409 Conflict` if its id is taken.
pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<TemplateDefinition>,
) -> Result<HttpResponse, ApiError> {
    let config = state.store.create_template(payload.into_inner())?;
    Ok(HttpResponse::Ok().json(config))
}

/// Actix web handler for `PUT /api/settings/templates/{id}`.
///
/// When the template now points at another file, the previous file is deleted unless
/// another template still uses it.
///
/// # Arguments
/// * `id` - The template to replace, extracted from the URL path.
/// * `payload` - The new definition.
///
/// # Returns
/// - `200 OK` with the refreshed `FormConfig`.
/// - `404 Not Found` if no template has that id.
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<TemplateDefinition>,
) -> Result<HttpResponse, ApiError> {
    let (config, previous) = state.store.update_template(&id, payload.into_inner())?;
    release_file(&state, &config, &previous.file_name);
    Ok(HttpResponse::Ok().json(config))
}

/// Actix web handler for `DELETE /api/settings/templates/{id}`.
///
/// # Returns
/// - `200 OK` with the refreshed `FormConfig`; the template's file is deleted when no
///   other template refers to it.
pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let (config, removed) = state.store.delete_template(&id)?;
    if let Some(removed) = removed {
        release_file(&state, &config, &removed.file_name);
    }
    Ok(HttpResponse::Ok().json(config))
}

/// Deletes a template file once no template refers to it any more.
fn release_file(state: &AppState, config: &FormConfig, file_name: &str) {
    if file_name.trim().is_empty()
        || config
            .templates
            .iter()
            .any(|template| template.file_name == file_name)
    {
        return;
    }
    if let Err(e) = state.storage.delete(file_name) {
        warn!("Could not delete template file '{}': {}", file_name, e);
    }
}
