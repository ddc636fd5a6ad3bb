//! Plain-text extraction for the recognized document formats.

use std::fs;
use std::path::Path;
use tracing::warn;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "pdf"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Extract plain text from a document. Extraction failures degrade to empty
/// text with a warning so a single bad file never aborts an ingest run.
pub fn load_text(path: &Path) -> String {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        match pdf_extract::extract_text(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "PDF extraction failed; treating as empty");
                String::new()
            }
        }
    } else {
        match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                warn!(path = %path.display(), %err, "Failed to read document; treating as empty");
                String::new()
            }
        }
    }
}
