//! # Document Service Module
//!
//! *   **`POST /generate/{template_id}`**: merges the submitted values into one template and
//!     returns the document (or its PDF) as an attachment.
//! *   **`POST /archive`**: renders several templates, each as original and/or PDF, and
//!     returns them packed in `Documents_<CONTRACT_NUMBER>.zip` (`Documents.zip` without a
//!     contract number).
//!
//! Both recompute the formula fields over the submitted values before merging, remember
//! the values of fields flagged `rememberValues`, and do the merge work on the blocking
//! thread pool.

mod archive;
mod single;

use crate::error::ApiError;
use crate::state::AppState;
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::web::{post, scope};
use actix_web::{HttpResponse, Scope};
use common::formula;
use common::model::values::merge_values;
use common::model::{FormConfig, FormValues};
use common::naming::content_disposition;
use log::warn;

pub fn configure_routes() -> Scope {
    scope(common::routes::DOCUMENTS_API)
        .route("/generate/{template_id}", post().to(single::process))
        .route("/archive", post().to(archive::process))
}

/// Submitted values with every formula field recomputed on top.
fn generation_values(config: &FormConfig, submitted: &FormValues) -> FormValues {
    merge_values(submitted, &formula::evaluate_all(&config.fields, submitted))
}

/// History is a convenience; a failure to record it never fails the download.
fn remember(state: &AppState, config: &FormConfig, values: &FormValues) {
    if let Err(e) = state.store.remember_values(config, values) {
        warn!("Could not remember field values: {}", e);
    }
}

fn attachment(file_name: &str, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((CONTENT_DISPOSITION, content_disposition(file_name)))
        .body(bytes)
}

fn unknown_template(id: &str) -> ApiError {
    ApiError::NotFound(format!("template '{}' not found", id))
}
