pub mod config;
pub mod field;
pub mod history;
pub mod template;
pub mod values;

pub use config::FormConfig;
pub use field::{FieldDefinition, FieldType};
pub use history::ValueHistory;
pub use template::TemplateDefinition;
pub use values::{ComputedValues, FormValues};
