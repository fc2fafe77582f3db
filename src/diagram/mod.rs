pub mod rules;

pub use rules::*;

use tracing::debug;

/// Opening fence of a diagram block
pub const DIAGRAM_FENCE: &str = "```mermaid";

const FENCE: &str = "```";

/// Counts from one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Diagram blocks found
    pub blocks: usize,
    /// Lines inside diagram blocks
    pub diagram_lines: usize,
    pub multi_word_edges: usize,
    pub bare_nodes: usize,
    pub label_parentheses: usize,
}

impl NormalizationStats {
    pub fn lines_rewritten(&self) -> usize {
        self.multi_word_edges + self.bare_nodes + self.label_parentheses
    }

    fn record(&mut self, rule: DiagramRule) {
        match rule {
            DiagramRule::MultiWordEdge => self.multi_word_edges += 1,
            DiagramRule::BareNode => self.bare_nodes += 1,
            DiagramRule::LabelParentheses => self.label_parentheses += 1,
            _ => {}
        }
    }
}

/// Repair every Mermaid block in a document
///
/// Text outside diagram blocks, fence lines and line terminators are kept
/// byte-for-byte. A block with no closing fence runs to the end of the input.
pub fn normalize_diagrams(document: &str) -> String {
    let (output, stats) = normalize_diagrams_with_stats(document);
    debug!(
        "Normalized {} diagram block(s): {} of {} lines rewritten",
        stats.blocks,
        stats.lines_rewritten(),
        stats.diagram_lines
    );
    output
}

pub fn normalize_diagrams_with_stats(document: &str) -> (String, NormalizationStats) {
    let mut output = String::with_capacity(document.len());
    let mut stats = NormalizationStats::default();
    let mut in_block = false;

    for segment in document.split_inclusive('\n') {
        let (body, terminator) = split_terminator(segment);
        let trimmed = body.trim_start();

        if !in_block {
            if trimmed.starts_with(DIAGRAM_FENCE) {
                in_block = true;
                stats.blocks += 1;
            }
            output.push_str(segment);
            continue;
        }

        if trimmed.starts_with(FENCE) {
            in_block = false;
            output.push_str(segment);
            continue;
        }

        stats.diagram_lines += 1;
        let (line, rule) = normalize_line(body);
        stats.record(rule);
        output.push_str(&line);
        output.push_str(terminator);
    }

    (output, stats)
}

fn split_terminator(segment: &str) -> (&str, &str) {
    if let Some(body) = segment.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = segment.strip_suffix('\n') {
        (body, "\n")
    } else {
        (segment, "")
    }
}
