//! The form session: field values, formula results, availability and archive selection
//! shared by every operation of one open form.

use crate::api::DocGenApi;
use crate::download::Download;
use crate::notify::Notifier;
use common::model::{FieldDefinition, FormConfig, ValueHistory};
use common::naming::{default_document_name, DEFAULT_ARCHIVE_NAME};
use common::requests::GenerateDocumentRequest;
use common::session::{ArchiveControl, FormState, FormulaDisplay, TemplateControl};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

/// A control that triggers a download and is disabled while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Control {
    Document { template_id: String, pdf: bool },
    Archive,
}

/// Marks a control busy until dropped.
struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<Control>>,
    control: Control,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a Mutex<HashSet<Control>>, control: Control) -> Option<Self> {
        let mut set = busy.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(control.clone()) {
            return None;
        }
        Some(BusyGuard { busy, control })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.control);
    }
}

pub struct FormSession {
    api: Arc<dyn DocGenApi>,
    notifier: Notifier,
    download_dir: PathBuf,
    config: RwLock<FormConfig>,
    history: RwLock<ValueHistory>,
    state: RwLock<FormState>,
    /// Sequence number of the latest formula request; older answers are discarded.
    formula_seq: AtomicU64,
    busy: Mutex<HashSet<Control>>,
}

impl FormSession {
    pub fn new(api: Arc<dyn DocGenApi>, notifier: Notifier, download_dir: impl Into<PathBuf>) -> Self {
        FormSession {
            api,
            notifier,
            download_dir: download_dir.into(),
            config: RwLock::new(FormConfig::default()),
            history: RwLock::new(ValueHistory::default()),
            state: RwLock::new(FormState::new()),
            formula_seq: AtomicU64::new(0),
            busy: Mutex::new(HashSet::new()),
        }
    }

    /// Fetches the schema and the value history. Returns false when the schema could not
    /// be loaded; a missing history only costs the suggestions.
    pub async fn load(&self) -> bool {
        let (config, history) = tokio::join!(self.api.form_config(), self.api.history());
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                self.notifier
                    .error(format!("Could not load the form: {}", e.user_message()));
                return false;
            }
        };
        match history {
            Ok(history) => *self.history.write().await = history,
            Err(e) => warn!("Value history unavailable: {}", e),
        }
        debug!(
            "Form loaded: {} fields, {} templates",
            config.fields.len(),
            config.templates.len()
        );
        *self.config.write().await = config;
        true
    }

    pub async fn config(&self) -> FormConfig {
        self.config.read().await.clone()
    }

    /// False while the server has no fields configured.
    pub async fn is_configured(&self) -> bool {
        !self.config.read().await.is_empty()
    }

    /// Fields in display order.
    pub async fn fields(&self) -> Vec<FieldDefinition> {
        self.config.read().await.sorted_fields().into_iter().cloned().collect()
    }

    pub async fn state(&self) -> FormState {
        self.state.read().await.clone()
    }

    pub async fn on_field_change(&self, placeholder: &str, raw: &str) {
        self.state.write().await.set_value(placeholder, raw);
        self.recompute_formulas().await;
    }

    /// Asks the server for the formula values. Returns true when the answer was applied:
    /// a failed request keeps the previous values, an answer overtaken by a newer request
    /// is dropped.
    pub async fn recompute_formulas(&self) -> bool {
        if !self
            .config
            .read()
            .await
            .fields
            .iter()
            .any(FieldDefinition::is_calculated)
        {
            return false;
        }

        let seq = self.formula_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let values = self.state.read().await.values.clone();
        match self.api.calculate_formulas(&values).await {
            Ok(computed) => {
                let mut state = self.state.write().await;
                if self.formula_seq.load(Ordering::SeqCst) != seq {
                    debug!("Discarding stale formula results #{}", seq);
                    return false;
                }
                state.apply_computed(computed);
                true
            }
            Err(e) => {
                warn!("Formula recomputation failed: {}", e);
                false
            }
        }
    }

    pub async fn is_submittable(&self) -> bool {
        self.state.read().await.is_submittable()
    }

    /// Asks which templates the current values satisfy. Returns the number of available
    /// templates, or `None` when nothing was checked.
    pub async fn check_availability(&self) -> Option<usize> {
        let merged = {
            let state = self.state.read().await;
            if !state.is_submittable() {
                self.notifier.warning("Fill in at least one field first");
                return None;
            }
            state.merged()
        };

        match self.api.check_availability(&merged).await {
            Ok(response) => {
                let available = response.available_templates.len();
                let evicted = self.state.write().await.apply_availability(response);
                if !evicted.is_empty() {
                    debug!("Deselected unavailable templates: {:?}", evicted);
                }
                if available == 0 {
                    self.notifier.info("No templates can be generated from these values");
                }
                Some(available)
            }
            Err(e) => {
                self.notifier.error(format!(
                    "Could not check template availability: {}",
                    e.user_message()
                ));
                None
            }
        }
    }

    /// Returns false when the template is not available and nothing changed.
    pub async fn toggle_selection(&self, template_id: &str, original: bool, pdf: bool) -> bool {
        self.state
            .write()
            .await
            .toggle_selection(template_id, original, pdf)
    }

    pub async fn selection_file_count(&self) -> usize {
        self.state.read().await.selection.file_count()
    }

    pub async fn template_controls(&self) -> Vec<TemplateControl> {
        self.state.read().await.template_controls()
    }

    pub async fn archive_control(&self) -> ArchiveControl {
        self.state.read().await.archive_control()
    }

    pub async fn formula_display(&self, placeholder: &str) -> FormulaDisplay {
        self.state.read().await.formula_display(placeholder)
    }

    pub fn is_busy(&self, control: &Control) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(control)
    }

    /// Generates one document and saves it into the download directory.
    pub async fn download_single(&self, template_id: &str, pdf: bool) -> Option<PathBuf> {
        let control = Control::Document {
            template_id: template_id.to_string(),
            pdf,
        };
        let _guard = BusyGuard::acquire(&self.busy, control)?;

        let request = GenerateDocumentRequest {
            form_data: self.state.read().await.merged(),
            convert_to_pdf: pdf,
        };
        let attachment = match self.api.generate_document(template_id, &request).await {
            Ok(attachment) => attachment,
            Err(e) => {
                self.notifier
                    .error(format!("Could not generate the document: {}", e.user_message()));
                return None;
            }
        };
        let download = Download::resolve(
            attachment.filename_hint,
            || default_document_name(template_id, pdf),
            attachment.bytes,
        );
        self.save(download)
    }

    /// Generates the selected templates as one archive and saves it.
    pub async fn download_archive(&self) -> Option<PathBuf> {
        let request = {
            let state = self.state.read().await;
            if state.selection.is_empty() {
                drop(state);
                self.notifier.warning("Select at least one document for the archive");
                return None;
            }
            state.selection.archive_request(state.merged())
        };
        let _guard = BusyGuard::acquire(&self.busy, Control::Archive)?;

        let attachment = match self.api.generate_archive(&request).await {
            Ok(attachment) => attachment,
            Err(e) => {
                self.notifier
                    .error(format!("Could not generate the archive: {}", e.user_message()));
                return None;
            }
        };
        let download = Download::resolve(
            attachment.filename_hint,
            || DEFAULT_ARCHIVE_NAME.to_string(),
            attachment.bytes,
        );
        self.save(download)
    }

    fn save(&self, download: Download) -> Option<PathBuf> {
        match download.save_into(&self.download_dir) {
            Ok(path) => {
                self.notifier.success(format!("Saved {}", download.file_name));
                Some(path)
            }
            Err(e) => {
                self.notifier
                    .error(format!("Could not save {}: {}", download.file_name, e));
                None
            }
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Forgets everything entered. Does nothing unless the user confirmed.
    pub async fn clear(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let mut state = self.state.write().await;
        // formula answers still in flight belong to the old values
        self.formula_seq.fetch_add(1, Ordering::SeqCst);
        state.clear();
        true
    }

    pub async fn suggestions(&self, field_id: &str) -> Vec<String> {
        self.history.read().await.values(field_id).to_vec()
    }

    /// Removes a remembered value on the server, then refreshes the local history.
    pub async fn delete_history_value(&self, field_id: &str, value: &str) -> bool {
        if let Err(e) = self.api.delete_history_value(field_id, value).await {
            self.notifier
                .error(format!("Could not delete the value: {}", e.user_message()));
            return false;
        }
        match self.api.history().await {
            Ok(history) => *self.history.write().await = history,
            Err(e) => {
                warn!("History refresh failed, updating locally: {}", e);
                self.history.write().await.remove(field_id, value);
            }
        }
        true
    }
}
