use actix_web::{web, App, HttpServer};
use backend::config::Settings;
use backend::documents::pdf::select_converter;
use backend::state::{run_shutdown_listener, AppState};
use backend::storage::TemplateStorage;
use backend::store::Store;
use env_logger::Env;
use log::{error, info, warn};
use std::io;
use std::thread;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let url = settings.url();

    let store = Store::open(&settings.database).map_err(io::Error::other)?;
    let config = store.load_config().map_err(io::Error::other)?;
    info!(
        "Configuration loaded from {}: {} fields, {} templates",
        settings.database.display(),
        config.fields.len(),
        config.templates.len()
    );

    let storage = TemplateStorage::new(&settings.templates_dir).map_err(io::Error::other)?;
    match storage.list() {
        Ok(files) => info!(
            "{} template files in {}",
            files.len(),
            settings.templates_dir.display()
        ),
        Err(e) => warn!("Could not scan {}: {}", settings.templates_dir.display(), e),
    }

    let converter = select_converter(settings.soffice.as_deref(), &settings.fonts_dir);
    let (state, shutdown_rx) = AppState::new(store, storage, converter);

    if settings.open_browser {
        let browser_url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&browser_url) {
                warn!("Could not open browser: {}", e);
            }
        });
    }

    info!("Server running at {}", url);

    let json_limit = settings.json_limit;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| backend::configure_app(cfg, json_limit))
    })
    .bind((settings.host.as_str(), settings.port))?
    .run();

    tokio::spawn(run_shutdown_listener(shutdown_rx, server.handle()));

    let result = server.await;
    if let Err(e) = &result {
        error!("Server stopped with error: {}", e);
    }
    result
}
