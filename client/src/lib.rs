//! Client core of the document generation form.
//!
//! [`session::FormSession`] tracks what the user typed, keeps the formula fields and the
//! archive selection in step with the server, and downloads documents.
//! [`settings::SettingsSession`] drives the authoring side. Neither renders anything: they
//! expose view state and push [`notify::Notification`]s for a display layer to show.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod notify;
pub mod session;
pub mod settings;

pub use api::http::HttpApi;
pub use api::DocGenApi;
pub use error::ClientError;
