use super::{GenerationError, RenderedDocument};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packs the documents into one ZIP. Entry names stay unique: a repeated name gets a
/// ` (n)` suffix before its extension.
pub fn build_archive(documents: &[RenderedDocument]) -> Result<Vec<u8>, GenerationError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for document in documents {
        let name = unique_name(&document.file_name, &mut used);
        writer.start_file(name, options)?;
        writer.write_all(&document.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (name, String::new()),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{stem} ({n}){extension}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
