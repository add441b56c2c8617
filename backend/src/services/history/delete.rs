use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::HistoryValueQuery;
use common::responses::SuccessResponse;
use log::info;

/// Actix web handler for `DELETE /api/history/{field_id}?value=`.
///
/// # Arguments
/// * `field_id` - The field whose history is edited, extracted from the URL path.
/// * `query` - The value to forget.
///
/// # Returns
/// - `200 OK` with `{success: true}`.
/// - `404 Not Found` if the value was not remembered for that field.
pub async fn process(
    state: web::Data<AppState>,
    field_id: web::Path<String>,
    query: web::Query<HistoryValueQuery>,
) -> Result<HttpResponse, ApiError> {
    let field_id = field_id.into_inner();
    if !state.store.remove_history_value(&field_id, &query.value)? {
        return Err(ApiError::NotFound(format!(
            "value not found in the history of field '{}'",
            field_id
        )));
    }
    info!("Removed a remembered value of field '{}'", field_id);
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}
