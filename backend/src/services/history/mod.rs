//! # Value History Service Module
//!
//! *   **`GET /`**: previously submitted values per field id, most recent first.
//! *   **`DELETE /{field_id}?value=`**: forgets one value; 404 when it was not remembered.

mod delete;
mod list;

use actix_web::web::{delete, get, scope};
use actix_web::Scope;
use common::routes::HISTORY_API;

pub fn configure_routes() -> Scope {
    scope(HISTORY_API)
        .route("", get().to(list::process))
        .route("/{field_id}", delete().to(delete::process))
}
