use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Highest `decimalPlaces` a formula field may request.
pub const MAX_DECIMAL_PLACES: u32 = 10;

/// Kind of input a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Textarea,
    /// Read-only field whose value the server derives from other fields.
    Formula,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Textarea,
        FieldType::Formula,
    ];

    /// Wire name, as used in JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Formula => "formula",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// One entry of the form schema.
///
/// `placeholder` is the key under which the value travels in submitted data and the
/// token formulas and download patterns refer to (e.g. `{{CONTRACT_NUMBER}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub id: String,
    pub display_name: String,
    pub placeholder: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub remember_values: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
}

impl FieldDefinition {
    /// True for fields whose value comes from the formula engine.
    pub fn is_calculated(&self) -> bool {
        self.field_type == FieldType::Formula
    }

    /// Checks the per-field invariants. Uniqueness across fields is checked by
    /// [`crate::model::FormConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::BlankId { kind: "field" });
        }
        if self.placeholder.trim().is_empty() {
            return Err(ConfigurationError::BlankPlaceholder {
                id: self.id.clone(),
            });
        }

        let has_formula = self
            .formula
            .as_deref()
            .is_some_and(|formula| !formula.trim().is_empty());

        if self.is_calculated() {
            if !has_formula {
                return Err(ConfigurationError::MissingFormula {
                    id: self.id.clone(),
                });
            }
            if let Some(places) = self.decimal_places {
                if places > MAX_DECIMAL_PLACES {
                    return Err(ConfigurationError::TooManyDecimals {
                        id: self.id.clone(),
                        places,
                        max: MAX_DECIMAL_PLACES,
                    });
                }
            }
        } else if has_formula || self.decimal_places.is_some() {
            return Err(ConfigurationError::UnexpectedFormula {
                id: self.id.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field(id: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            display_name: "Contract number".to_string(),
            placeholder: "{{CONTRACT_NUMBER}}".to_string(),
            field_type: FieldType::Text,
            order: 1,
            required: true,
            remember_values: true,
            formula: None,
            decimal_places: None,
        }
    }

    #[test]
    fn decodes_wire_format_with_legacy_flag() {
        let json = r#"{
            "id": "total",
            "displayName": "Total",
            "placeholder": "{{TOTAL}}",
            "fieldType": "formula",
            "required": false,
            "order": 3,
            "formula": "{{PRICE}} * {{QTY}}",
            "isCalculated": true,
            "rememberValues": false,
            "decimalPlaces": 2
        }"#;

        let field: FieldDefinition = serde_json::from_str(json).unwrap();
        assert!(field.is_calculated());
        assert_eq!(field.decimal_places, Some(2));
        assert_eq!(field.formula.as_deref(), Some("{{PRICE}} * {{QTY}}"));
        field.validate().unwrap();
    }

    #[test]
    fn null_formula_settings_decode_as_absent() {
        let json = r#"{"id":"a","displayName":"A","placeholder":"A","fieldType":"text",
            "formula":null,"decimalPlaces":null}"#;
        let field: FieldDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(field.formula, None);
        field.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_field_type() {
        let json = r#"{"id":"a","displayName":"A","placeholder":"A","fieldType":"checkbox"}"#;
        assert!(serde_json::from_str::<FieldDefinition>(json).is_err());
    }

    #[test]
    fn formula_field_needs_a_formula() {
        let mut field = text_field("sum");
        field.field_type = FieldType::Formula;
        field.formula = Some("   ".to_string());
        assert_eq!(
            field.validate(),
            Err(ConfigurationError::MissingFormula {
                id: "sum".to_string()
            })
        );
    }

    #[test]
    fn plain_field_cannot_carry_formula_settings() {
        let mut field = text_field("name");
        field.decimal_places = Some(2);
        assert!(matches!(
            field.validate(),
            Err(ConfigurationError::UnexpectedFormula { .. })
        ));
    }

    #[test]
    fn blank_placeholder_is_rejected() {
        let mut field = text_field("name");
        field.placeholder = " ".to_string();
        assert!(matches!(
            field.validate(),
            Err(ConfigurationError::BlankPlaceholder { .. })
        ));
    }

    #[test]
    fn decimal_places_are_bounded() {
        let mut field = text_field("ratio");
        field.field_type = FieldType::Formula;
        field.formula = Some("A / B".to_string());
        field.decimal_places = Some(MAX_DECIMAL_PLACES + 1);
        assert!(matches!(
            field.validate(),
            Err(ConfigurationError::TooManyDecimals { .. })
        ));
    }
}
