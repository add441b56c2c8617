use crate::error::ConfigurationError;
use crate::model::field::FieldDefinition;
use crate::model::template::TemplateDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The form schema served by the configuration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
}

impl FormConfig {
    /// Decodes and validates a configuration payload in one step, so a malformed server
    /// response never reaches the session as partially-filled structs.
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigurationError> {
        let config: FormConfig = serde_json::from_slice(bytes)
            .map_err(|e| ConfigurationError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut field_ids = HashSet::new();
        let mut placeholders = HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if !field_ids.insert(field.id.as_str()) {
                return Err(ConfigurationError::DuplicateId {
                    kind: "field",
                    id: field.id.clone(),
                });
            }
            if !placeholders.insert(field.placeholder.as_str()) {
                return Err(ConfigurationError::DuplicatePlaceholder {
                    placeholder: field.placeholder.clone(),
                });
            }
        }

        let mut template_ids = HashSet::new();
        for template in &self.templates {
            template.validate()?;
            if !template_ids.insert(template.id.as_str()) {
                return Err(ConfigurationError::DuplicateId {
                    kind: "template",
                    id: template.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Nothing to fill in: rendered as an empty state, not as an error.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in display order. The sort is stable, so equal `order` keeps schema order.
    pub fn sorted_fields(&self) -> Vec<&FieldDefinition> {
        let mut fields: Vec<&FieldDefinition> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.order);
        fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn field_by_placeholder(&self, placeholder: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.placeholder == placeholder)
    }

    pub fn template(&self, id: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|template| template.id == id)
    }
}
