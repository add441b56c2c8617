//! Authoring session: edits the form schema and the template files on the server.
//!
//! Every mutation answers with the server's refreshed configuration, which replaces the
//! local copy. Destructive operations only run when the caller passes `confirmed`.

use crate::api::DocGenApi;
use crate::error::ClientError;
use crate::notify::Notifier;
use common::model::{FieldDefinition, FormConfig, TemplateDefinition};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

const TEMPLATE_EXTENSIONS: [&str; 2] = ["docx", "xlsx"];

pub struct SettingsSession {
    api: Arc<dyn DocGenApi>,
    notifier: Notifier,
    config: RwLock<FormConfig>,
    files: RwLock<Vec<String>>,
}

impl SettingsSession {
    pub fn new(api: Arc<dyn DocGenApi>, notifier: Notifier) -> Self {
        SettingsSession {
            api,
            notifier,
            config: RwLock::new(FormConfig::default()),
            files: RwLock::new(Vec::new()),
        }
    }

    pub async fn load(&self) -> bool {
        let (config, files) = tokio::join!(self.api.settings_config(), self.api.template_files());
        match config {
            Ok(config) => *self.config.write().await = config,
            Err(e) => {
                self.failed("load the settings", &e);
                return false;
            }
        }
        match files {
            Ok(files) => *self.files.write().await = files,
            Err(e) => self.failed("list the template files", &e),
        }
        true
    }

    pub async fn config(&self) -> FormConfig {
        self.config.read().await.clone()
    }

    pub async fn files(&self) -> Vec<String> {
        self.files.read().await.clone()
    }

    fn failed(&self, action: &str, err: &ClientError) {
        self.notifier
            .error(format!("Could not {}: {}", action, err.user_message()));
    }

    fn invalid(&self, message: impl Into<String>) -> bool {
        self.notifier.warning(message);
        false
    }

    async fn apply(&self, result: Result<FormConfig, ClientError>, action: &str, done: &str) -> bool {
        match result {
            Ok(config) => {
                *self.config.write().await = config;
                self.notifier.success(done);
                true
            }
            Err(e) => {
                self.failed(action, &e);
                false
            }
        }
    }

    /// Creates the field, or updates the one stored under `existing_id`.
    pub async fn save_field(&self, field: FieldDefinition, existing_id: Option<&str>) -> bool {
        let mut checked = field.clone();
        if checked.id.trim().is_empty() {
            checked.id = existing_id.unwrap_or("new").to_string();
        }
        if let Err(e) = checked.validate() {
            return self.invalid(e.to_string());
        }
        if checked.display_name.trim().is_empty() {
            return self.invalid("The field needs a name");
        }

        let result = match existing_id {
            Some(id) => self.api.update_field(id, &field).await,
            None => self.api.create_field(&field).await,
        };
        self.apply(result, "save the field", "Field saved").await
    }

    pub async fn delete_field(&self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let result = self.api.delete_field(id).await;
        self.apply(result, "delete the field", "Field deleted").await
    }

    /// Uploads a local `.docx` / `.xlsx` file. Returns the name the server stored it under.
    pub async fn upload_template_file(&self, path: &Path) -> Option<String> {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            self.invalid("Choose a template file");
            return None;
        };
        let supported = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                TEMPLATE_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            });
        if !supported {
            self.invalid("Only .docx and .xlsx templates are supported");
            return None;
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.failed("read the file", &ClientError::Io(e));
                return None;
            }
        };
        if bytes.is_empty() {
            self.invalid("The template file is empty");
            return None;
        }

        match self.api.upload_template_file(file_name, bytes).await {
            Ok(stored) => {
                debug!("Uploaded {} as {}", path.display(), stored);
                self.notifier.success(format!("Uploaded {}", stored));
                if let Ok(files) = self.api.template_files().await {
                    *self.files.write().await = files;
                }
                Some(stored)
            }
            Err(e) => {
                self.failed("upload the file", &e);
                None
            }
        }
    }

    /// Creates the template, or updates the one stored under `existing_id`. A freshly
    /// uploaded file replaces the template's file.
    pub async fn save_template(
        &self,
        mut template: TemplateDefinition,
        existing_id: Option<&str>,
        uploaded_file: Option<String>,
    ) -> bool {
        if let Some(file_name) = uploaded_file {
            template.file_name = file_name;
        }
        if template.display_name.trim().is_empty() {
            return self.invalid("The template needs a name");
        }
        if template.file_name.trim().is_empty() {
            return self.invalid("Upload a template file first");
        }
        if template.required_field_ids.is_empty() {
            return self.invalid("Select at least one required field");
        }

        let result = match existing_id {
            Some(id) => self.api.update_template(id, &template).await,
            None => self.api.create_template(&template).await,
        };
        self.apply(result, "save the template", "Template saved").await
    }

    pub async fn delete_template(&self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let result = self.api.delete_template(id).await;
        self.apply(result, "delete the template", "Template deleted")
            .await
    }

    pub async fn refresh_files(&self) -> Vec<String> {
        match self.api.template_files().await {
            Ok(files) => {
                *self.files.write().await = files.clone();
                files
            }
            Err(e) => {
                self.failed("list the template files", &e);
                self.files().await
            }
        }
    }

    pub async fn shutdown(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.api.shutdown().await {
            Ok(()) => {
                self.notifier.info("The server is shutting down");
                true
            }
            Err(e) => {
                self.failed("stop the server", &e);
                false
            }
        }
    }
}
