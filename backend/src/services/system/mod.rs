//! # System Service Module
//!
//! *   **`POST /shutdown`**: acknowledges the request and stops the server shortly after.

mod shutdown;

use actix_web::web::{post, scope};
use actix_web::Scope;
use common::routes::SYSTEM_API;

pub fn configure_routes() -> Scope {
    scope(SYSTEM_API).route("/shutdown", post().to(shutdown::process))
}
