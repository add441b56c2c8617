use crate::model::FormValues;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    #[serde(default)]
    pub form_data: FormValues,
    #[serde(default)]
    pub convert_to_pdf: bool,
}

/// Batch generation. A template absent from `original_flags` is rendered in its native
/// format; one absent from `pdf_flags` gets no PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArchiveRequest {
    #[serde(default)]
    pub form_data: FormValues,
    #[serde(default)]
    pub template_ids: Vec<String>,
    #[serde(default)]
    pub original_flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub pdf_flags: BTreeMap<String, bool>,
}

impl GenerateArchiveRequest {
    pub fn wants_original(&self, template_id: &str) -> bool {
        self.original_flags.get(template_id).copied().unwrap_or(true)
    }

    pub fn wants_pdf(&self, template_id: &str) -> bool {
        self.pdf_flags.get(template_id).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryValueQuery {
    pub value: String,
}
