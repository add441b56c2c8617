//! Document generation: placeholder merge into the uploaded template, optional PDF
//! conversion, and ZIP packing of several documents.

mod archive;
pub mod merge;
pub mod pdf;

use crate::storage::{StorageError, TemplateStorage};
use common::model::{FormValues, TemplateDefinition};
use common::naming::{document_name, pdf_name};
use log::warn;
use pdf::PdfConverter;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;

pub use archive::build_archive;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("template file is not a valid office document: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid merge pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("template part {part} is not valid UTF-8")]
    Encoding { part: String },
    #[error("PDF conversion unavailable")]
    PdfUnavailable,
    #[error("PDF conversion failed: {0}")]
    Pdf(String),
    #[error("no document could be generated")]
    NothingGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pdf: bool,
}

impl RenderedDocument {
    pub fn content_type(&self) -> &'static str {
        if self.pdf {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

/// One template of an archive request with the formats wanted for it.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub template: TemplateDefinition,
    pub original: bool,
    pub pdf: bool,
}

pub struct DocumentGenerator {
    storage: TemplateStorage,
    converter: Option<Arc<dyn PdfConverter>>,
}

impl DocumentGenerator {
    pub fn new(storage: TemplateStorage, converter: Option<Arc<dyn PdfConverter>>) -> Self {
        DocumentGenerator { storage, converter }
    }

    pub fn pdf_available(&self) -> bool {
        self.converter.is_some()
    }

    fn merged(
        &self,
        template: &TemplateDefinition,
        values: &FormValues,
    ) -> Result<Vec<u8>, GenerationError> {
        let package = self.storage.read(&template.file_name)?;
        merge::merge_template(&package, values)
    }

    fn convert(
        &self,
        template: &TemplateDefinition,
        name: &str,
        merged: &[u8],
    ) -> Result<RenderedDocument, GenerationError> {
        let converter = self
            .converter
            .as_ref()
            .ok_or(GenerationError::PdfUnavailable)?;
        Ok(RenderedDocument {
            file_name: pdf_name(name),
            bytes: converter.convert(&template.file_name, merged)?,
            pdf: true,
        })
    }

    /// Generates one document. `values` must already hold the computed formula values.
    pub fn render(
        &self,
        template: &TemplateDefinition,
        values: &FormValues,
        pdf: bool,
    ) -> Result<RenderedDocument, GenerationError> {
        if pdf && self.converter.is_none() {
            return Err(GenerationError::PdfUnavailable);
        }
        let merged = self.merged(template, values)?;
        let name = document_name(template, values);
        if pdf {
            self.convert(template, &name, &merged)
        } else {
            Ok(RenderedDocument {
                file_name: name,
                bytes: merged,
                pdf: false,
            })
        }
    }

    fn render_job(
        &self,
        job: &ArchiveJob,
        values: &FormValues,
    ) -> Vec<Result<RenderedDocument, GenerationError>> {
        let merged = match self.merged(&job.template, values) {
            Ok(merged) => merged,
            Err(e) => return vec![Err(e)],
        };
        let name = document_name(&job.template, values);

        let mut documents = Vec::new();
        if job.pdf {
            documents.push(self.convert(&job.template, &name, &merged));
        }
        if job.original {
            documents.insert(
                0,
                Ok(RenderedDocument {
                    file_name: name,
                    bytes: merged,
                    pdf: false,
                }),
            );
        }
        documents
    }

    /// Renders every job in parallel and packs the results. Documents that fail are left
    /// out of the archive; when nothing could be rendered the first failure is returned.
    pub fn render_archive(
        &self,
        jobs: &[ArchiveJob],
        values: &FormValues,
    ) -> Result<Vec<u8>, GenerationError> {
        let results: Vec<(String, Result<RenderedDocument, GenerationError>)> = jobs
            .par_iter()
            .flat_map_iter(|job| {
                self.render_job(job, values)
                    .into_iter()
                    .map(move |result| (job.template.id.clone(), result))
            })
            .collect();

        let mut documents = Vec::new();
        let mut first_error = None;
        for (template_id, result) in results {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Skipping template '{}' in archive: {}", template_id, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if documents.is_empty() {
            return Err(first_error.unwrap_or(GenerationError::NothingGenerated));
        }
        build_archive(&documents)
    }
}
