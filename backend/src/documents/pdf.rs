//! PDF conversion of merged documents.
//!
//! With LibreOffice installed, the merged package is converted by `soffice --headless`,
//! which keeps the original layout. Without it, the merged text is laid out with genpdf
//! using a font family found in the fonts directory.

use super::merge::extract_lines;
use super::GenerationError;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::Document;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Font families tried in order.
const FONT_FAMILIES: [&str; 2] = ["Arial", "LiberationSans"];

pub trait PdfConverter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Converts a merged `.docx` / `.xlsx` package; `file_name` carries its extension.
    fn convert(&self, file_name: &str, document: &[u8]) -> Result<Vec<u8>, GenerationError>;
}

/// Converter backed by a LibreOffice installation.
pub struct OfficeConverter {
    binary: PathBuf,
}

impl OfficeConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        OfficeConverter {
            binary: binary.into(),
        }
    }
}

impl PdfConverter for OfficeConverter {
    fn name(&self) -> &'static str {
        "LibreOffice"
    }

    fn convert(&self, file_name: &str, document: &[u8]) -> Result<Vec<u8>, GenerationError> {
        let workdir = tempfile::tempdir()?;
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("docx")
            .to_ascii_lowercase();
        let input = workdir.path().join(format!("document.{extension}"));
        fs::write(&input, document)?;

        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workdir.path())
            .arg(&input)
            .output()?;
        if !output.status.success() {
            return Err(GenerationError::Pdf(format!(
                "soffice exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        fs::read(workdir.path().join("document.pdf")).map_err(|e| {
            GenerationError::Pdf(format!("soffice produced no PDF: {e}"))
        })
    }
}

/// Converter that renders the document's plain text, one paragraph per line.
pub struct TextPdfRenderer {
    fonts_dir: PathBuf,
    family: &'static str,
}

impl TextPdfRenderer {
    /// Looks for a usable font family; `None` when the directory has none.
    pub fn discover(fonts_dir: &Path) -> Option<Self> {
        FONT_FAMILIES.into_iter().find_map(|family| {
            match genpdf::fonts::from_files(fonts_dir, family, None) {
                Ok(_) => Some(TextPdfRenderer {
                    fonts_dir: fonts_dir.to_path_buf(),
                    family,
                }),
                Err(_) => None,
            }
        })
    }

    fn load_font(&self) -> Result<FontFamily<FontData>, GenerationError> {
        genpdf::fonts::from_files(&self.fonts_dir, self.family, None)
            .map_err(|e| GenerationError::Pdf(e.to_string()))
    }

    fn configure_document(&self, title: &str) -> Result<Document, GenerationError> {
        let mut doc = Document::new(self.load_font()?);
        doc.set_title(title);
        doc.set_font_size(10);
        doc.set_line_spacing(1.15);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

impl PdfConverter for TextPdfRenderer {
    fn name(&self) -> &'static str {
        "text layout"
    }

    fn convert(&self, file_name: &str, document: &[u8]) -> Result<Vec<u8>, GenerationError> {
        let mut doc = self.configure_document(file_name)?;
        for line in extract_lines(document)? {
            if line.trim().is_empty() {
                doc.push(Break::new(1));
            } else {
                doc.push(Paragraph::new(line));
            }
        }

        let mut pdf = Vec::new();
        doc.render(&mut pdf)
            .map_err(|e| GenerationError::Pdf(e.to_string()))?;
        Ok(pdf)
    }
}

/// Picks the converter for this installation: LibreOffice when configured, the text
/// renderer when fonts are available, nothing otherwise.
pub fn select_converter(
    soffice: Option<&Path>,
    fonts_dir: &Path,
) -> Option<Arc<dyn PdfConverter>> {
    if let Some(binary) = soffice {
        info!("PDF conversion via LibreOffice at {}", binary.display());
        return Some(Arc::new(OfficeConverter::new(binary)));
    }
    match TextPdfRenderer::discover(fonts_dir) {
        Some(renderer) => {
            info!(
                "PDF conversion via text layout with font family {}",
                renderer.family
            );
            Some(Arc::new(renderer))
        }
        None => {
            warn!(
                "No LibreOffice configured and no fonts in {}; PDF conversion disabled",
                fonts_dir.display()
            );
            None
        }
    }
}
