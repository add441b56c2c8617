use super::{Attachment, DocGenApi};
use crate::error::ClientError;
use async_trait::async_trait;
use common::model::{
    ComputedValues, FieldDefinition, FormConfig, FormValues, TemplateDefinition, ValueHistory,
};
use common::naming::parse_filename_hint;
use common::requests::{GenerateArchiveRequest, GenerateDocumentRequest};
use common::responses::{AvailabilityResponse, ErrorResponse, UploadResponse};
use common::routes;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// [`DocGenApi`] over HTTP.
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Configuration payloads are validated before they reach a session.
    async fn config(&self, request: RequestBuilder) -> Result<FormConfig, ClientError> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(FormConfig::decode(&bytes)?)
    }

    async fn attachment(&self, request: RequestBuilder) -> Result<Attachment, ClientError> {
        let response = self.send(request).await?;
        let filename_hint = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_filename_hint);
        let bytes = response.bytes().await?.to_vec();
        Ok(Attachment {
            filename_hint,
            bytes,
        })
    }
}

#[async_trait]
impl DocGenApi for HttpApi {
    async fn form_config(&self) -> Result<FormConfig, ClientError> {
        self.config(self.client.get(self.url(&routes::form_config())?))
            .await
    }

    async fn calculate_formulas(&self, values: &FormValues) -> Result<ComputedValues, ClientError> {
        let url = self.url(&routes::form_formulas())?;
        self.json(self.client.post(url).json(values)).await
    }

    async fn check_availability(
        &self,
        values: &FormValues,
    ) -> Result<AvailabilityResponse, ClientError> {
        let url = self.url(&routes::form_availability())?;
        self.json(self.client.post(url).json(values)).await
    }

    async fn history(&self) -> Result<ValueHistory, ClientError> {
        self.json(self.client.get(self.url(&routes::history())?))
            .await
    }

    async fn delete_history_value(&self, field_id: &str, value: &str) -> Result<(), ClientError> {
        let url = self.url(&routes::history_value(field_id, value))?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn generate_document(
        &self,
        template_id: &str,
        request: &GenerateDocumentRequest,
    ) -> Result<Attachment, ClientError> {
        let url = self.url(&routes::generate_document(template_id))?;
        self.attachment(self.client.post(url).json(request)).await
    }

    async fn generate_archive(
        &self,
        request: &GenerateArchiveRequest,
    ) -> Result<Attachment, ClientError> {
        let url = self.url(&routes::generate_archive())?;
        self.attachment(self.client.post(url).json(request)).await
    }

    async fn settings_config(&self) -> Result<FormConfig, ClientError> {
        self.config(self.client.get(self.url(&routes::settings_config())?))
            .await
    }

    async fn replace_config(&self, config: &FormConfig) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_config())?;
        self.config(self.client.put(url).json(config)).await
    }

    async fn create_field(&self, field: &FieldDefinition) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_fields())?;
        self.config(self.client.post(url).json(field)).await
    }

    async fn update_field(
        &self,
        id: &str,
        field: &FieldDefinition,
    ) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_field(id))?;
        self.config(self.client.put(url).json(field)).await
    }

    async fn delete_field(&self, id: &str) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_field(id))?;
        self.config(self.client.delete(url)).await
    }

    async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_templates())?;
        self.config(self.client.post(url).json(template)).await
    }

    async fn update_template(
        &self,
        id: &str,
        template: &TemplateDefinition,
    ) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_template(id))?;
        self.config(self.client.put(url).json(template)).await
    }

    async fn delete_template(&self, id: &str) -> Result<FormConfig, ClientError> {
        let url = self.url(&routes::settings_template(id))?;
        self.config(self.client.delete(url)).await
    }

    async fn upload_template_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let url = self.url(&routes::settings_upload())?;
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let uploaded: UploadResponse = self.json(self.client.post(url).multipart(form)).await?;
        Ok(uploaded.file_name)
    }

    async fn template_files(&self) -> Result<Vec<String>, ClientError> {
        self.json(self.client.get(self.url(&routes::settings_template_files())?))
            .await
    }

    async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(self.client.post(self.url(&routes::shutdown())?))
            .await?;
        Ok(())
    }
}
