pub mod documents;
pub mod form;
pub mod history;
pub mod settings;
pub mod system;
