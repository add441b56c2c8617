use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// A document template the user can generate once its required fields are filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    #[serde(default)]
    pub id: String,
    pub display_name: String,
    /// Name of the uploaded `.docx` / `.xlsx` file in the templates directory.
    #[serde(default)]
    pub file_name: String,
    /// Naming rule for generated output, e.g. `Invoice_{{CONTRACT_NUMBER}}.docx`.
    #[serde(default)]
    pub download_pattern: String,
    /// Ids of the fields that must be non-blank before the template can be generated.
    #[serde(default)]
    pub required_field_ids: Vec<String>,
}

impl TemplateDefinition {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::BlankId { kind: "template" });
        }
        if self.file_name.trim().is_empty() {
            return Err(ConfigurationError::MissingTemplateFile {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Extension of the underlying file, lowercase and without the dot.
    pub fn file_extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}
