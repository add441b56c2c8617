//! Uploaded template files, kept flat in one directory.

use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const ALLOWED_EXTENSIONS: [&str; 2] = ["docx", "xlsx"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("only .docx and .xlsx files are supported, got '{name}'")]
    UnsupportedType { name: String },
    #[error("invalid file name '{name}'")]
    InvalidName { name: String },
    #[error("uploaded file is empty")]
    Empty,
    #[error("template file '{name}' not found")]
    Missing { name: String },
}

/// Reduces a client supplied name to its last path component and checks the extension.
pub fn sanitize_file_name(raw: &str) -> Result<String, StorageError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidName {
            name: raw.to_string(),
        });
    }
    if !is_template_file(name) {
        return Err(StorageError::UnsupportedType {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn is_template_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

#[derive(Debug, Clone)]
pub struct TemplateStorage {
    dir: PathBuf,
}

impl TemplateStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(TemplateStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.dir.join(sanitize_file_name(name)?))
    }

    /// Starts an upload; bytes are written to a temporary file in the templates directory
    /// and only become visible under `name` once [`Upload::finish`] succeeds.
    pub fn begin_upload(&self, name: &str) -> Result<Upload, StorageError> {
        let target = self.path(name)?;
        Ok(Upload {
            file: NamedTempFile::new_in(&self.dir)?,
            target,
            written: 0,
        })
    }

    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let mut upload = self.begin_upload(name)?;
        upload.write_chunk(bytes)?;
        upload.finish()
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path(name)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::Missing {
                name: name.to_string(),
            },
            _ => StorageError::Io(e),
        })
    }

    /// Returns false when there was nothing to delete.
    pub fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Template file '{}' deleted", name);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// `.docx` / `.xlsx` files in the directory, sorted by name.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if is_template_file(&name) => names.push(name),
                Ok(_) => {}
                Err(name) => warn!("Skipping non UTF-8 file name {:?}", name),
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A template file being received.
pub struct Upload {
    file: NamedTempFile,
    target: PathBuf,
    written: usize,
}

impl Upload {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.file.write_all(chunk)?;
        self.written += chunk.len();
        Ok(())
    }

    /// Moves the received file into place, replacing an existing file of the same name.
    pub fn finish(mut self) -> Result<String, StorageError> {
        if self.written == 0 {
            return Err(StorageError::Empty);
        }
        self.file.flush()?;
        let name = self
            .target
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        self.file
            .persist(&self.target)
            .map_err(|e| StorageError::Io(e.error))?;
        info!("Template file '{}' stored ({} bytes)", name, self.written);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_reduced_to_their_last_component() {
        assert_eq!(sanitize_file_name("C:\\docs\\invoice.DOCX").unwrap(), "invoice.DOCX");
        assert_eq!(sanitize_file_name("../../etc/cmr.xlsx").unwrap(), "cmr.xlsx");
        assert!(matches!(
            sanitize_file_name("notes.txt"),
            Err(StorageError::UnsupportedType { .. })
        ));
        assert!(matches!(
            sanitize_file_name("dir/"),
            Err(StorageError::InvalidName { .. })
        ));
    }

    #[test]
    fn save_list_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TemplateStorage::new(dir.path().join("templates")).unwrap();

        assert_eq!(storage.save("b.xlsx", b"second").unwrap(), "b.xlsx");
        assert_eq!(storage.save("a.docx", b"first").unwrap(), "a.docx");
        storage.save("a.docx", b"replaced").unwrap();
        fs::write(storage.dir().join("readme.txt"), b"ignored").unwrap();

        assert_eq!(storage.list().unwrap(), ["a.docx", "b.xlsx"]);
        assert_eq!(storage.read("a.docx").unwrap(), b"replaced");

        assert!(storage.delete("a.docx").unwrap());
        assert!(!storage.delete("a.docx").unwrap());
        assert!(matches!(
            storage.read("a.docx"),
            Err(StorageError::Missing { .. })
        ));
    }

    #[test]
    fn empty_uploads_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TemplateStorage::new(dir.path()).unwrap();
        assert!(matches!(storage.save("a.docx", b""), Err(StorageError::Empty)));
        assert!(storage.list().unwrap().is_empty());
    }
}
