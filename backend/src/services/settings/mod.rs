//! # Settings Service Module
//!
//! Authoring endpoints. Every mutation answers with the refreshed `FormConfig` so the
//! settings page can replace its copy wholesale.
//!
//! *   **`GET /config`**, **`PUT /config`**: read or replace the whole schema.
//! *   **`POST /fields`**, **`PUT /fields/{id}`**, **`DELETE /fields/{id}`**
//! *   **`POST /templates`**, **`PUT /templates/{id}`**, **`DELETE /templates/{id}`**:
//!     an update that points the template at another file, and a delete, remove the file
//!     that is no longer referenced.
//! *   **`POST /templates/upload`**: multipart upload of a `.docx` / `.xlsx` file in the
//!     `file` part.
//! *   **`GET /templates/files`**: uploaded template files, sorted by name.

mod config;
mod fields;
mod files;
mod templates;
mod upload;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::routes::SETTINGS_API;

pub fn configure_routes() -> Scope {
    scope(SETTINGS_API)
        .route("/config", get().to(config::get))
        .route("/config", put().to(config::replace))
        .route("/fields", post().to(fields::create))
        .route("/fields/{id}", put().to(fields::update))
        .route("/fields/{id}", delete().to(fields::delete))
        .route("/templates/upload", post().to(upload::process))
        .route("/templates/files", get().to(files::process))
        .route("/templates", post().to(templates::create))
        .route("/templates/{id}", put().to(templates::update))
        .route("/templates/{id}", delete().to(templates::delete))
}
