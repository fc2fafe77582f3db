use tracing::info;

use crate::llm::{build_extraction_prompt, parse_requirements, GenerationError, GenerationService};
use crate::models::{render_transcript_with_summaries, ChatMessage, Requirement, SupportingDocument};

/// Configuration for requirement extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Maximum characters of each supporting document embedded in the prompt
    pub document_excerpt_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            document_excerpt_chars: 5000,
        }
    }
}

/// Derive structured requirements from a conversation, its summaries and
/// supporting documents
///
/// Transport failures propagate. A response that holds no parseable JSON
/// array yields an empty list. With neither chat nor documents there is
/// nothing to analyze and the service is not called.
pub async fn extract_requirements<S: GenerationService + ?Sized>(
    service: &S,
    chat_history: &[ChatMessage],
    summaries: &[String],
    documents: &[SupportingDocument],
    config: &ExtractionConfig,
) -> Result<Vec<Requirement>, GenerationError> {
    let transcript = (!chat_history.is_empty() || !summaries.is_empty())
        .then(|| render_transcript_with_summaries(chat_history, summaries));
    extract_from_transcript(service, transcript.as_deref(), documents, config).await
}

/// Same as [`extract_requirements`] for an already-rendered transcript
pub async fn extract_from_transcript<S: GenerationService + ?Sized>(
    service: &S,
    transcript: Option<&str>,
    documents: &[SupportingDocument],
    config: &ExtractionConfig,
) -> Result<Vec<Requirement>, GenerationError> {
    let transcript = transcript.filter(|t| !t.trim().is_empty());
    if transcript.is_none() && documents.is_empty() {
        info!("No chat or documents to extract requirements from");
        return Ok(Vec::new());
    }

    info!(
        "Extracting requirements from {} document(s){}",
        documents.len(),
        if transcript.is_some() { " and chat" } else { "" }
    );

    let prompt = build_extraction_prompt(transcript, documents, config.document_excerpt_chars);
    let response = service.generate(&prompt).await?;
    let requirements = parse_requirements(&response);

    info!("Extracted {} requirements", requirements.len());
    Ok(requirements)
}
