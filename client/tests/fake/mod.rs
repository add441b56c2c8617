#![allow(dead_code)]

use async_trait::async_trait;
use client::api::Attachment;
use client::notify::Notification;
use client::{ClientError, DocGenApi};
use common::availability::check_availability;
use common::model::{
    ComputedValues, FieldDefinition, FieldType, FormConfig, FormValues, TemplateDefinition,
    ValueHistory,
};
use common::requests::{GenerateArchiveRequest, GenerateDocumentRequest};
use common::responses::AvailabilityResponse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, Notify};

/// In-memory stand-in for the server. Formula requests for `A = "slow"` wait on `gate`.
#[derive(Default)]
pub struct FakeApi {
    pub config: Mutex<FormConfig>,
    pub history: Mutex<ValueHistory>,
    pub files: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
    pub hint: Mutex<Option<String>>,
    pub archive_requests: Mutex<Vec<GenerateArchiveRequest>>,
    pub gate: Notify,
    pub fail_formulas: AtomicBool,
    pub fail_generation: AtomicBool,
    pub fail_history: AtomicBool,
    /// Generation requests wait on `gate` while set.
    pub hold_generation: AtomicBool,
}

fn server_error() -> ClientError {
    ClientError::Status {
        status: 500,
        message: "boom".to_string(),
    }
}

impl FakeApi {
    pub fn with_config(config: FormConfig) -> Self {
        FakeApi {
            config: Mutex::new(config),
            ..FakeApi::default()
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn called(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    fn attachment(&self) -> Result<Attachment, ClientError> {
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(Attachment {
            filename_hint: self.hint.lock().unwrap().clone(),
            bytes: b"generated".to_vec(),
        })
    }

    fn updated(&self, update: impl FnOnce(&mut FormConfig)) -> Result<FormConfig, ClientError> {
        let mut config = self.config.lock().unwrap();
        update(&mut config);
        Ok(config.clone())
    }
}

#[async_trait]
impl DocGenApi for FakeApi {
    async fn form_config(&self) -> Result<FormConfig, ClientError> {
        self.record("form_config");
        Ok(self.config.lock().unwrap().clone())
    }

    async fn calculate_formulas(&self, values: &FormValues) -> Result<ComputedValues, ClientError> {
        self.record("formulas");
        if self.fail_formulas.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let a = values.get("A").cloned().unwrap_or_default();
        if a == "slow" {
            self.gate.notified().await;
        }
        Ok(BTreeMap::from([("TOTAL".to_string(), format!("{}!", a))]))
    }

    async fn check_availability(
        &self,
        values: &FormValues,
    ) -> Result<AvailabilityResponse, ClientError> {
        self.record("availability");
        let config = self.config.lock().unwrap().clone();
        Ok(check_availability(&config, values))
    }

    async fn history(&self) -> Result<ValueHistory, ClientError> {
        self.record("history");
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete_history_value(&self, field_id: &str, value: &str) -> Result<(), ClientError> {
        self.record("delete_history");
        self.history.lock().unwrap().remove(field_id, value);
        Ok(())
    }

    async fn generate_document(
        &self,
        _template_id: &str,
        _request: &GenerateDocumentRequest,
    ) -> Result<Attachment, ClientError> {
        self.record("document");
        if self.hold_generation.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.attachment()
    }

    async fn generate_archive(
        &self,
        request: &GenerateArchiveRequest,
    ) -> Result<Attachment, ClientError> {
        self.record("archive");
        self.archive_requests.lock().unwrap().push(request.clone());
        self.attachment()
    }

    async fn settings_config(&self) -> Result<FormConfig, ClientError> {
        self.record("settings_config");
        Ok(self.config.lock().unwrap().clone())
    }

    async fn replace_config(&self, config: &FormConfig) -> Result<FormConfig, ClientError> {
        self.record("replace_config");
        self.updated(|current| *current = config.clone())
    }

    async fn create_field(&self, field: &FieldDefinition) -> Result<FormConfig, ClientError> {
        self.record("create_field");
        let mut field = field.clone();
        if field.id.is_empty() {
            field.id = format!("generated-{}", field.placeholder.to_lowercase());
        }
        self.updated(|config| config.fields.push(field))
    }

    async fn update_field(
        &self,
        id: &str,
        field: &FieldDefinition,
    ) -> Result<FormConfig, ClientError> {
        self.record("update_field");
        self.updated(|config| {
            if let Some(existing) = config.fields.iter_mut().find(|f| f.id == id) {
                *existing = FieldDefinition {
                    id: id.to_string(),
                    ..field.clone()
                };
            }
        })
    }

    async fn delete_field(&self, id: &str) -> Result<FormConfig, ClientError> {
        self.record("delete_field");
        self.updated(|config| config.fields.retain(|f| f.id != id))
    }

    async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError> {
        self.record("create_template");
        let template = template.clone();
        self.updated(|config| config.templates.push(template))
    }

    async fn update_template(
        &self,
        id: &str,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError> {
        self.record("update_template");
        self.updated(|config| {
            if let Some(existing) = config.templates.iter_mut().find(|t| t.id == id) {
                *existing = template.clone();
            }
        })
    }

    async fn delete_template(&self, id: &str) -> Result<FormConfig, ClientError> {
        self.record("delete_template");
        self.updated(|config| config.templates.retain(|t| t.id != id))
    }

    async fn upload_template_file(
        &self,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        self.record("upload");
        self.files.lock().unwrap().push(file_name.to_string());
        Ok(file_name.to_string())
    }

    async fn template_files(&self) -> Result<Vec<String>, ClientError> {
        self.record("files");
        Ok(self.files.lock().unwrap().clone())
    }

    async fn shutdown(&self) -> Result<(), ClientError> {
        self.record("shutdown");
        Ok(())
    }
}

pub fn field(id: &str, placeholder: &str, order: i32) -> FieldDefinition {
    FieldDefinition {
        id: id.to_string(),
        display_name: placeholder.to_string(),
        placeholder: placeholder.to_string(),
        field_type: FieldType::Number,
        order,
        required: false,
        remember_values: true,
        formula: None,
        decimal_places: None,
    }
}

pub fn formula(id: &str, placeholder: &str, expression: &str) -> FieldDefinition {
    FieldDefinition {
        field_type: FieldType::Formula,
        remember_values: false,
        formula: Some(expression.to_string()),
        decimal_places: Some(2),
        ..field(id, placeholder, 99)
    }
}

pub fn template(id: &str, required: &[&str]) -> TemplateDefinition {
    TemplateDefinition {
        id: id.to_string(),
        display_name: format!("Template {}", id),
        file_name: format!("{}.docx", id.to_lowercase()),
        download_pattern: String::new(),
        required_field_ids: required.iter().map(|id| id.to_string()).collect(),
    }
}

/// Fields `A` and `B`, the formula `TOTAL = A * 2`, template `T` needing `a` and `U`
/// needing `b`.
pub fn scenario() -> FormConfig {
    FormConfig {
        fields: vec![
            field("b", "B", 2),
            field("a", "A", 1),
            formula("total", "TOTAL", "A * 2"),
        ],
        templates: vec![template("T", &["a"]), template("U", &["b"])],
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        notifications.push(notification);
    }
    notifications
}
