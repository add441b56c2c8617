use crate::error::ClientError;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A generated file ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Uses the server's name when it sent a usable one, `fallback` otherwise.
    pub fn resolve(hint: Option<String>, fallback: impl FnOnce() -> String, bytes: Vec<u8>) -> Self {
        let file_name = hint
            .as_deref()
            .and_then(|hint| Path::new(hint).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(fallback);
        Download { file_name, bytes }
    }

    /// Writes the file into `dir`, replacing a file of the same name. The file only
    /// appears once it is complete.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, ClientError> {
        let target = dir.join(&self.file_name);
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&self.bytes)?;
        file.flush()?;
        file.persist(&target).map_err(|e| ClientError::Io(e.error))?;
        info!("Saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}
