use super::{attachment, generation_values, remember, unknown_template};
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::GenerateDocumentRequest;
use log::info;

/// Actix web handler for `POST /api/documents/generate/{template_id}`.
///
/// Recomputes the formula fields over `formData`, merges the values into the template's
/// file and, when `convertToPdf` is set, converts the result. Values of fields flagged
/// `rememberValues` are recorded once the document exists.
///
/// # Arguments
/// * `template_id` - The template to generate, extracted from the URL path.
/// * `payload` - `{formData, convertToPdf}`.
///
/// # Returns
/// - `200 OK` with the document bytes and a `Content-Disposition` filename hint.
/// - `404 Not Found` if the template does not exist or its file is missing.
/// - `503 Service Unavailable` if a PDF was requested and no converter is available.
pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<String>,
    payload: web::Json<GenerateDocumentRequest>,
) -> Result<HttpResponse, ApiError> {
    let template_id = template_id.into_inner();
    let request = payload.into_inner();

    let config = state.store.load_config()?;
    let template = config
        .template(&template_id)
        .cloned()
        .ok_or_else(|| unknown_template(&template_id))?;
    let values = generation_values(&config, &request.form_data);

    let generator = state.generator.clone();
    let pdf = request.convert_to_pdf;
    let render_values = values.clone();
    let document = web::block(move || generator.render(&template, &render_values, pdf)).await??;

    remember(&state, &config, &values);
    info!(
        "Generated '{}' from template '{}' ({} bytes)",
        document.file_name,
        template_id,
        document.bytes.len()
    );
    Ok(attachment(
        &document.file_name,
        document.content_type(),
        document.bytes,
    ))
}
