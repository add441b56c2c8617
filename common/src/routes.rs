//! Paths of the HTTP API. Each service lives under its own scope.

pub const FORM_API: &str = "/api/form";
pub const HISTORY_API: &str = "/api/history";
pub const DOCUMENTS_API: &str = "/api/documents";
pub const SETTINGS_API: &str = "/api/settings";
pub const SYSTEM_API: &str = "/api/system";

pub fn form_config() -> String {
    format!("{FORM_API}/config")
}

pub fn form_formulas() -> String {
    format!("{FORM_API}/formulas")
}

pub fn form_availability() -> String {
    format!("{FORM_API}/availability")
}

pub fn history() -> String {
    HISTORY_API.to_string()
}

pub fn history_value(field_id: &str, value: &str) -> String {
    format!(
        "{HISTORY_API}/{}?value={}",
        urlencoding::encode(field_id),
        urlencoding::encode(value)
    )
}

pub fn generate_document(template_id: &str) -> String {
    format!("{DOCUMENTS_API}/generate/{}", urlencoding::encode(template_id))
}

pub fn generate_archive() -> String {
    format!("{DOCUMENTS_API}/archive")
}

pub fn settings_config() -> String {
    format!("{SETTINGS_API}/config")
}

pub fn settings_fields() -> String {
    format!("{SETTINGS_API}/fields")
}

pub fn settings_field(id: &str) -> String {
    format!("{SETTINGS_API}/fields/{}", urlencoding::encode(id))
}

pub fn settings_templates() -> String {
    format!("{SETTINGS_API}/templates")
}

pub fn settings_template(id: &str) -> String {
    format!("{SETTINGS_API}/templates/{}", urlencoding::encode(id))
}

pub fn settings_upload() -> String {
    format!("{SETTINGS_API}/templates/upload")
}

pub fn settings_template_files() -> String {
    format!("{SETTINGS_API}/templates/files")
}

pub fn shutdown() -> String {
    format!("{SYSTEM_API}/shutdown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(history_value("client name", "A&B"), "/api/history/client%20name?value=A%26B");
        assert_eq!(generate_document("cmr/1"), "/api/documents/generate/cmr%2F1");
    }
}
