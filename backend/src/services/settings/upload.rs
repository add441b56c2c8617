use crate::error::ApiError;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::responses::UploadResponse;
use futures_util::StreamExt;

/// Actix web handler for `POST /api/settings/templates/upload`.
///
/// Streams the `file` part of the request into the templates directory, replacing a file
/// of the same name.
///
/// # Arguments
/// * `payload` - The multipart body; parts other than `file` are ignored.
///
/// # Returns
/// - `200 OK` with `{fileName}`, the name the file was stored under.
/// - `400 Bad Request` if the part is missing, empty, or not a `.docx` / `.xlsx` file.
pub async fn process(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let file_name = upload_template(&state, payload).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { file_name }))
}

async fn upload_template(state: &AppState, mut payload: Multipart) -> Result<String, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if part_name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let mut upload = state.storage.begin_upload(&filename)?;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            upload.write_chunk(&chunk)?;
        }
        return Ok(upload.finish()?);
    }
    Err(ApiError::BadRequest("missing 'file' part".to_string()))
}
