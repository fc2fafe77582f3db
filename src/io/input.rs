use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{Requirement, SupportingDocument};

/// Read a supporting document as text
///
/// Invalid UTF-8 is replaced rather than rejected. The document type is
/// derived from the filename.
pub fn load_document(path: &Path) -> Result<SupportingDocument> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read document: {:?}", path))?;
    let content = String::from_utf8_lossy(&bytes).into_owned();

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let doc = SupportingDocument::new(filename, content);
    info!(
        "Loaded {} ({}, {} characters)",
        doc.filename,
        doc.document_type,
        doc.content.chars().count()
    );
    Ok(doc)
}

/// Load several documents, skipping any that cannot be read
pub fn load_documents(paths: &[PathBuf]) -> Vec<SupportingDocument> {
    paths
        .iter()
        .filter_map(|path| match load_document(path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping {:?}: {:#}", path, e);
                None
            }
        })
        .collect()
}

/// Read a JSON array of requirements
pub fn load_requirements(path: &Path) -> Result<Vec<Requirement>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requirements file: {:?}", path))?;
    let requirements: Vec<Requirement> =
        serde_json::from_str(&content).context("Failed to parse requirements JSON")?;
    Ok(requirements)
}

/// Read a chat transcript as plain text
pub fn load_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chat transcript: {:?}", path))
}
