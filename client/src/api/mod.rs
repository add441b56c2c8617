//! The HTTP contract as a trait, so sessions can run against the real server or a fake.

pub mod http;

use crate::error::ClientError;
use async_trait::async_trait;
use common::model::{
    ComputedValues, FieldDefinition, FormConfig, FormValues, TemplateDefinition, ValueHistory,
};
use common::requests::{GenerateArchiveRequest, GenerateDocumentRequest};
use common::responses::AvailabilityResponse;

/// A file returned by a generation endpoint, with the name the server suggested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename_hint: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DocGenApi: Send + Sync {
    async fn form_config(&self) -> Result<FormConfig, ClientError>;

    async fn calculate_formulas(&self, values: &FormValues) -> Result<ComputedValues, ClientError>;

    async fn check_availability(
        &self,
        values: &FormValues,
    ) -> Result<AvailabilityResponse, ClientError>;

    async fn history(&self) -> Result<ValueHistory, ClientError>;

    async fn delete_history_value(&self, field_id: &str, value: &str) -> Result<(), ClientError>;

    async fn generate_document(
        &self,
        template_id: &str,
        request: &GenerateDocumentRequest,
    ) -> Result<Attachment, ClientError>;

    async fn generate_archive(
        &self,
        request: &GenerateArchiveRequest,
    ) -> Result<Attachment, ClientError>;

    async fn settings_config(&self) -> Result<FormConfig, ClientError>;

    async fn replace_config(&self, config: &FormConfig) -> Result<FormConfig, ClientError>;

    async fn create_field(&self, field: &FieldDefinition) -> Result<FormConfig, ClientError>;

    async fn update_field(
        &self,
        id: &str,
        field: &FieldDefinition,
    ) -> Result<FormConfig, ClientError>;

    async fn delete_field(&self, id: &str) -> Result<FormConfig, ClientError>;

    async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError>;

    async fn update_template(
        &self,
        id: &str,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError>;

    async fn delete_template(&self, id: &str) -> Result<FormConfig, ClientError>;

    /// Returns the name the server stored the file under.
    async fn upload_template_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError>;

    async fn template_files(&self) -> Result<Vec<String>, ClientError>;

    async fn shutdown(&self) -> Result<(), ClientError>;
}
