use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;

use crate::diagram::DIAGRAM_FENCE;
use crate::models::Requirement;

/// Section markers checked when scoring a generated document
pub const REQUIRED_SECTIONS: [&str; 10] = [
    "Executive Summary",
    "Architecture Diagram",
    "Architecture Pattern",
    "System Component",
    "Technology Stack",
    "Data Architecture",
    "Non-Functional",
    "Deployment",
    "Integration",
    "Trade-off",
];

const VIEWING_NOTE: &str = "\
> **Viewing Diagrams**: This document contains Mermaid diagrams that render in:
> - GitHub, GitLab, Bitbucket (automatic)
> - VS Code (install \"Markdown Preview Mermaid Support\" extension)
> - Online viewers: [mermaid.live](https://mermaid.live)
> - Export to PNG/SVG: Use [Mermaid CLI](https://github.com/mermaid-js/mermaid-cli)";

/// A finished architecture document ready to be written out
#[derive(Debug, Clone)]
pub struct ArchitectureDocument {
    content: String,
}

impl ArchitectureDocument {
    /// Wrap generated text as-is
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Prepend the document title, a diagram viewing note and today's date
    pub fn with_viewing_header(content: &str) -> Self {
        Self::with_viewing_header_at(content, Local::now())
    }

    fn with_viewing_header_at(content: &str, generated: DateTime<Local>) -> Self {
        let header = format!(
            "# Solution Architecture Document\n\n{}\n\n*Generated: {}*\n\n---\n\n",
            VIEWING_NOTE,
            generated.format("%Y-%m-%d")
        );
        Self {
            content: header + content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metrics(&self) -> ArchitectureMetrics {
        ArchitectureMetrics::analyze(&self.content)
    }

    /// Write to a markdown file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        file.write_all(self.content.as_bytes())
            .with_context(|| format!("Failed to write file: {:?}", path))?;
        Ok(())
    }
}

/// Rough quality measures of a generated document
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectureMetrics {
    /// Markdown headings of level 1 to 3
    pub headings: usize,
    pub diagrams: usize,
    pub words: usize,
    /// Entries of [`REQUIRED_SECTIONS`] found anywhere in the text
    pub sections_found: Vec<&'static str>,
}

fn heading_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?m)^#{1,3}\s+").expect("Invalid regex"))
}

impl ArchitectureMetrics {
    pub fn analyze(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let sections_found = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|s| lowered.contains(&s.to_lowercase()))
            .collect();

        Self {
            headings: heading_regex().find_iter(text).count(),
            diagrams: text.matches(DIAGRAM_FENCE).count(),
            words: text.split_whitespace().count(),
            sections_found,
        }
    }

    /// Percentage of required sections present
    pub fn completeness(&self) -> u8 {
        (self.sections_found.len() * 100 / REQUIRED_SECTIONS.len()) as u8
    }

    pub fn missing_sections(&self) -> Vec<&'static str> {
        REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|s| !self.sections_found.contains(s))
            .collect()
    }
}

/// Write requirements as a pretty-printed JSON array
pub fn write_requirements(path: &Path, requirements: &[Requirement]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, requirements).context("Failed to write JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::io::load_requirements;
    use crate::models::Priority;

    #[test]
    fn test_viewing_header_precedes_content() {
        let generated = Local.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let doc = ArchitectureDocument::with_viewing_header_at("## 1. Executive Summary", generated);

        assert!(doc.content().starts_with("# Solution Architecture Document\n\n> **Viewing Diagrams**"));
        assert!(doc.content().contains("*Generated: 2025-03-14*"));
        assert!(doc.content().ends_with("---\n\n## 1. Executive Summary"));
    }

    #[test]
    fn test_write_file_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("architecture.md");
        let doc = ArchitectureDocument::new("```mermaid\r\ngraph TD\r\n```");

        doc.write_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.content());
    }

    #[test]
    fn test_metrics() {
        let text = "\
# Title
## 1. Executive Summary
Some words here.
### Architecture Diagrams
```mermaid
graph TD
```
#### Deep heading
## Technology stack
```mermaid
sequenceDiagram
```
";
        let metrics = ArchitectureMetrics::analyze(text);
        assert_eq!(metrics.headings, 4);
        assert_eq!(metrics.diagrams, 2);
        assert_eq!(
            metrics.sections_found,
            vec!["Executive Summary", "Architecture Diagram", "Technology Stack"]
        );
        assert_eq!(metrics.completeness(), 30);
        assert_eq!(metrics.missing_sections().len(), 7);
        assert!(metrics.missing_sections().contains(&"Trade-off"));
    }

    #[test]
    fn test_metrics_of_empty_document() {
        let metrics = ArchitectureMetrics::analyze("");
        assert_eq!(metrics.words, 0);
        assert_eq!(metrics.completeness(), 0);
        assert_eq!(metrics.missing_sections().len(), REQUIRED_SECTIONS.len());
    }

    #[test]
    fn test_requirements_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.json");
        let reqs = vec![Requirement::new("99.9% uptime").with_priority(Priority::High)];

        write_requirements(&path, &reqs).unwrap();
        let loaded = load_requirements(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].statement, "99.9% uptime");
        assert_eq!(loaded[0].priority, Some(Priority::High));
    }
}
