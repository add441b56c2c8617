use thiserror::Error;

/// A configuration payload that decodes but does not describe a usable form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("malformed configuration payload: {0}")]
    Malformed(String),
    #[error("{kind} id must not be blank")]
    BlankId { kind: &'static str },
    #[error("field `{id}` has a blank placeholder")]
    BlankPlaceholder { id: String },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("placeholder `{placeholder}` is used by more than one field")]
    DuplicatePlaceholder { placeholder: String },
    #[error("formula field `{id}` has no formula")]
    MissingFormula { id: String },
    #[error("field `{id}` is not a formula field but carries formula settings")]
    UnexpectedFormula { id: String },
    #[error("field `{id}` asks for {places} decimal places, at most {max} are supported")]
    TooManyDecimals { id: String, places: u32, max: u32 },
    #[error("template `{id}` has no template file")]
    MissingTemplateFile { id: String },
}
