use super::{render_transcript, render_transcript_with_summaries, ChatMessage, GenerationContext, Requirement, SupportingDocument};

/// Application state for one requirements-gathering session
///
/// Owned by the caller and passed by reference to whatever drives the
/// interaction (the `chat` subcommand here).
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Visible conversation, user input recorded verbatim
    pub chat_history: Vec<ChatMessage>,
    pub requirements: Vec<Requirement>,
    pub supporting_docs: Vec<SupportingDocument>,
    /// Model summaries of the conversation, oldest first
    pub summaries: Vec<String>,
    /// Set once the user or the model ends the conversation
    pub chat_completed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document unless one with the same filename is already present
    pub fn add_document(&mut self, doc: SupportingDocument) -> bool {
        if self.supporting_docs.iter().any(|d| d.filename == doc.filename) {
            return false;
        }
        self.supporting_docs.push(doc);
        true
    }

    pub fn remove_document(&mut self, filename: &str) -> bool {
        let before = self.supporting_docs.len();
        self.supporting_docs.retain(|d| d.filename != filename);
        self.supporting_docs.len() != before
    }

    pub fn add_requirement(&mut self, requirement: Requirement) {
        self.requirements.push(requirement);
    }

    pub fn remove_requirement(&mut self, index: usize) -> Option<Requirement> {
        (index < self.requirements.len()).then(|| self.requirements.remove(index))
    }

    pub fn record_user(&mut self, content: impl Into<String>) {
        self.chat_history.push(ChatMessage::user(content));
    }

    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.chat_history.push(ChatMessage::assistant(content));
    }

    pub fn add_summary(&mut self, summary: impl Into<String>) {
        let summary = summary.into();
        if !summary.trim().is_empty() {
            self.summaries.push(summary);
        }
    }

    /// Rendered transcript plus summaries, or `None` if nothing has been said
    pub fn transcript(&self) -> Option<String> {
        if self.chat_history.is_empty() {
            None
        } else {
            Some(render_transcript_with_summaries(
                &self.chat_history,
                &self.summaries,
            ))
        }
    }

    /// The last `messages` turns of the visible conversation
    pub fn recent_transcript(&self, messages: usize) -> String {
        let start = self.chat_history.len().saturating_sub(messages);
        render_transcript(&self.chat_history[start..])
    }

    /// Generation needs a finished conversation or at least one document
    pub fn can_generate(&self) -> bool {
        let has_chat = self.chat_completed && !self.chat_history.is_empty();
        has_chat || !self.supporting_docs.is_empty()
    }

    pub fn generation_context(&self) -> GenerationContext {
        let mut context = GenerationContext::new(self.requirements.clone())
            .with_documents(self.supporting_docs.clone());
        if let Some(transcript) = self.transcript() {
            context = context.with_chat_transcript(transcript);
        }
        context
    }
}
