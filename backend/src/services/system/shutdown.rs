use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::responses::MessageResponse;
use log::{info, warn};

/// Actix web handler for `POST /api/system/shutdown`.
///
/// Only signals the shutdown listener; the server stops once this response is sent.
///
/// # Returns
/// - `200 OK` with `{message}`.
pub async fn process(state: web::Data<AppState>) -> HttpResponse {
    info!("Shutdown requested");
    // A full channel means a shutdown is already pending.
    if let Err(e) = state.shutdown.try_send(()) {
        warn!("Shutdown signal not queued: {}", e);
    }
    HttpResponse::Ok().json(MessageResponse {
        message: "Server is shutting down".to_string(),
    })
}
