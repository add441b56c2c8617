//! File names of generated documents and the `Content-Disposition` hint that carries them.

use crate::model::values::{resolve, FormValues};
use crate::model::TemplateDefinition;

/// Archive name used without a contract number, and by clients when the response carries
/// no usable hint.
pub const DEFAULT_ARCHIVE_NAME: &str = "Documents.zip";

/// Placeholder whose value names the archive.
pub const CONTRACT_NUMBER: &str = "{{CONTRACT_NUMBER}}";

const FILENAME_STAR_PREFIX: &str = "filename*=utf-8''";

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Deterministic fallback for a single document.
pub fn default_document_name(template_id: &str, pdf: bool) -> String {
    let extension = if pdf { "pdf" } else { "docx" };
    format!("document_{}.{}", template_id, extension)
}

/// Expands `{{NAME}}` tokens of a download pattern with the submitted values (unknown
/// placeholders expand to nothing) and replaces characters that are not allowed in file
/// names with `_`.
pub fn render_download_pattern(pattern: &str, values: &FormValues) -> String {
    let mut expanded = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find("{{") {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[2..].find("}}") {
            Some(len) if len > 0 && !tail[2..2 + len].contains('}') => {
                let token = &tail[..len + 4];
                expanded.push_str(resolve(values, token).unwrap_or_default());
                rest = &tail[len + 4..];
            }
            _ => {
                expanded.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    expanded.push_str(rest);

    sanitize(expanded.trim())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `Documents_<contract number>.zip`, or [`DEFAULT_ARCHIVE_NAME`] when the submitted values
/// carry no contract number.
pub fn archive_name(values: &FormValues) -> String {
    match resolve(values, CONTRACT_NUMBER).map(str::trim) {
        Some(number) if !number.is_empty() => format!("Documents_{}.zip", sanitize(number)),
        _ => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}

/// Name of the native document generated from `template`.
///
/// Falls back to [`default_document_name`] when the pattern renders to nothing and appends
/// the template file's extension when the pattern has none.
pub fn document_name(template: &TemplateDefinition, values: &FormValues) -> String {
    let rendered = render_download_pattern(&template.download_pattern, values);
    if rendered.is_empty() {
        return default_document_name(&template.id, false);
    }
    match template.file_extension() {
        Some(ext) if !rendered.to_ascii_lowercase().ends_with(&format!(".{ext}")) => {
            format!("{rendered}.{ext}")
        }
        _ => rendered,
    }
}

/// Swaps a `.docx` / `.xlsx` extension for `.pdf`, or appends one.
pub fn pdf_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    for ext in [".docx", ".xlsx"] {
        if lower.ends_with(ext) {
            return format!("{}.pdf", &name[..name.len() - ext.len()]);
        }
    }
    if lower.ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}

/// `attachment; filename*=UTF-8''<percent-encoded name>`
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

/// Extracts the name from a `filename*=UTF-8''…` parameter. Any other form is ignored.
pub fn parse_filename_hint(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();
    let start = lower.find(FILENAME_STAR_PREFIX)? + FILENAME_STAR_PREFIX.len();
    let raw = header[start..].split(';').next()?.trim().trim_matches('"');
    let decoded = urlencoding::decode(raw).ok()?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}
