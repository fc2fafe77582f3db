use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse document classification, derived from the filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Requirements,
    Specification,
    Design,
    ApiDocumentation,
    General,
}

impl DocumentType {
    /// Classify a document by keywords in its filename
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.to_lowercase();

        if name.contains("requirement") || name.contains("req") {
            Self::Requirements
        } else if name.contains("spec") {
            Self::Specification
        } else if name.contains("design") {
            Self::Design
        } else if name.contains("api") {
            Self::ApiDocumentation
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Requirements => "requirements",
            DocumentType::Specification => "specification",
            DocumentType::Design => "design",
            DocumentType::ApiDocumentation => "api_documentation",
            DocumentType::General => "general",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supporting document whose text has already been extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocument {
    /// File name (no directory)
    pub filename: String,
    /// Full extracted text
    pub content: String,
    /// Document classification
    pub document_type: DocumentType,
}

impl SupportingDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let filename = filename.into();
        let document_type = DocumentType::from_filename(&filename);
        Self {
            filename,
            content: content.into(),
            document_type,
        }
    }

    /// Content truncated to at most `limit` characters, with `...` appended when cut
    pub fn excerpt(&self, limit: usize) -> String {
        match self.content.char_indices().nth(limit) {
            Some((byte_idx, _)) => format!("{}...", &self.content[..byte_idx]),
            None => self.content.clone(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_filename() {
        assert_eq!(DocumentType::from_filename("Requirements.md"), DocumentType::Requirements);
        assert_eq!(DocumentType::from_filename("req_v2.txt"), DocumentType::Requirements);
        assert_eq!(DocumentType::from_filename("system_spec.md"), DocumentType::Specification);
        assert_eq!(DocumentType::from_filename("DESIGN-notes.txt"), DocumentType::Design);
        assert_eq!(DocumentType::from_filename("public_api.md"), DocumentType::ApiDocumentation);
        assert_eq!(DocumentType::from_filename("notes.txt"), DocumentType::General);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let doc = SupportingDocument::new("notes.txt", "héllo wörld");
        assert_eq!(doc.excerpt(5), "héllo...");
        assert_eq!(doc.excerpt(11), "héllo wörld");
        assert_eq!(doc.excerpt(100), "héllo wörld");
    }

    #[test]
    fn test_word_count() {
        let doc = SupportingDocument::new("a.txt", "one two\n\nthree   four");
        assert_eq!(doc.word_count(), 4);
    }
}
