use super::{attachment, generation_values, remember};
use crate::documents::ArchiveJob;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::naming::archive_name;
use common::requests::GenerateArchiveRequest;
use log::{info, warn};

/// Actix web handler for `POST /api/documents/archive`.
///
/// Unknown template ids and templates with neither format selected are skipped. Entries
/// that fail to render are left out of the archive and logged.
///
/// # Arguments
/// * `payload` - `{formData, templateIds, originalFlags, pdfFlags}`.
///
/// # Returns
/// - `200 OK` with the ZIP bytes and a `Content-Disposition` filename hint,
///   `Documents_<CONTRACT_NUMBER>.zip` or `Documents.zip`.
/// - `400 Bad Request` if no known template with a selected format remains.
/// - The first generation error if no entry could be rendered.
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<GenerateArchiveRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    if request.template_ids.is_empty() {
        return Err(ApiError::BadRequest("no templates selected".to_string()));
    }

    let config = state.store.load_config()?;
    let jobs: Vec<ArchiveJob> = request
        .template_ids
        .iter()
        .filter_map(|id| match config.template(id) {
            Some(template) => Some(ArchiveJob {
                template: template.clone(),
                original: request.wants_original(id),
                pdf: request.wants_pdf(id),
            }),
            None => {
                warn!("Skipping unknown template '{}' in archive", id);
                None
            }
        })
        .filter(|job| job.original || job.pdf)
        .collect();
    if jobs.is_empty() {
        return Err(ApiError::BadRequest(
            "no known template with a format selected".to_string(),
        ));
    }

    let values = generation_values(&config, &request.form_data);
    let generator = state.generator.clone();
    let render_values = values.clone();
    let count = jobs.len();
    let archive = web::block(move || generator.render_archive(&jobs, &render_values)).await??;

    remember(&state, &config, &values);
    info!("Generated archive for {} templates ({} bytes)", count, archive.len());
    let name = archive_name(&request.form_data);
    Ok(attachment(&name, "application/zip", archive))
}
