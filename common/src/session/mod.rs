//! Client-side session state that does not depend on any transport: the tracked form values
//! and the archive selection reconciled against the server's availability answer.

mod form;
mod selection;

pub use form::{ArchiveControl, AvailabilityView, FormState, FormulaDisplay, TemplateControl};
pub use selection::{
    file_count_label, reconcile_selection, ArchiveSelection, AvailabilitySet, FormatFlags,
};
