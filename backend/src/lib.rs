//! Document generation server: form schema, formula evaluation, template availability and
//! document/archive generation over HTTP.

pub mod config;
pub mod documents;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;

use actix_web::web;

/// Registers every service scope and the JSON body limit on an application.
pub fn configure_app(cfg: &mut web::ServiceConfig, json_limit: usize) {
    cfg.app_data(web::JsonConfig::default().limit(json_limit))
        .service(services::form::configure_routes())
        .service(services::history::configure_routes())
        .service(services::documents::configure_routes())
        .service(services::settings::configure_routes())
        .service(services::system::configure_routes());
}
