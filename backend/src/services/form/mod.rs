//! # Form Service Module
//!
//! Endpoints the form page talks to while the user fills it in:
//!
//! *   **`GET /config`**: the form schema (`FormConfig`).
//! *   **`POST /formulas`**: computes every formula field from the submitted values and
//!     returns placeholder → formatted result.
//! *   **`POST /availability`**: recomputes the formulas, then reports which templates have
//!     all their required fields filled, alongside the full template catalog.

mod availability;
mod config;
mod formulas;

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::routes::FORM_API;

pub fn configure_routes() -> Scope {
    scope(FORM_API)
        .route("/config", get().to(config::process))
        .route("/formulas", post().to(formulas::process))
        .route("/availability", post().to(availability::process))
}
