//! Shared application state, injected into every handler as `web::Data<AppState>`.

use crate::documents::pdf::PdfConverter;
use crate::documents::DocumentGenerator;
use crate::storage::TemplateStorage;
use crate::store::Store;
use actix_web::dev::ServerHandle;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause between a shutdown request and the server stopping, so the response that
/// acknowledged the request still reaches the client.
pub const SHUTDOWN_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub storage: TemplateStorage,
    pub generator: Arc<DocumentGenerator>,
    /// Signals the shutdown listener started in `main.rs`.
    pub shutdown: mpsc::Sender<()>,
}

impl AppState {
    pub fn new(
        store: Store,
        storage: TemplateStorage,
        converter: Option<Arc<dyn PdfConverter>>,
    ) -> (Self, mpsc::Receiver<()>) {
        let (shutdown, rx) = mpsc::channel(1);
        let generator = Arc::new(DocumentGenerator::new(storage.clone(), converter));
        (
            AppState {
                store,
                storage,
                generator,
                shutdown,
            },
            rx,
        )
    }
}

/// Waits for the first shutdown request and stops the server gracefully.
pub async fn run_shutdown_listener(mut rx: mpsc::Receiver<()>, server: ServerHandle) {
    if rx.recv().await.is_some() {
        tokio::time::sleep(SHUTDOWN_DELAY).await;
        info!("Stopping server");
        server.stop(true).await;
    }
}
