use serde::{Deserialize, Serialize};

use super::{Requirement, SupportingDocument};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a requirements-gathering conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Render chat history as `User: ...` / `AI: ...` lines
pub fn render_transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|m| match m.role {
            ChatRole::User => format!("User: {}", m.content),
            ChatRole::Assistant => format!("AI: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rendered history followed by one `AI Summary Blocks:` line when summaries exist
pub fn render_transcript_with_summaries(history: &[ChatMessage], summaries: &[String]) -> String {
    let mut transcript = render_transcript(history);
    if !summaries.is_empty() {
        if !transcript.is_empty() {
            transcript.push('\n');
        }
        transcript.push_str("AI Summary Blocks: ");
        transcript.push_str(&summaries.join(" "));
    }
    transcript
}

/// Read-only input to one architecture generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Ordered requirement list (may be empty)
    pub requirements: Vec<Requirement>,
    /// Supporting documents, if any were supplied
    pub documents: Option<Vec<SupportingDocument>>,
    /// Rendered chat transcript, if a conversation took place
    pub chat_transcript: Option<String>,
}

impl GenerationContext {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self {
            requirements,
            ..Default::default()
        }
    }

    /// Attach documents; an empty list is stored as `None`
    pub fn with_documents(mut self, documents: Vec<SupportingDocument>) -> Self {
        self.documents = if documents.is_empty() {
            None
        } else {
            Some(documents)
        };
        self
    }

    /// Attach a chat transcript; blank text is stored as `None`
    pub fn with_chat_transcript(mut self, transcript: impl Into<String>) -> Self {
        let transcript = transcript.into();
        self.chat_transcript = if transcript.trim().is_empty() {
            None
        } else {
            Some(transcript)
        };
        self
    }

    pub fn documents(&self) -> &[SupportingDocument] {
        self.documents.as_deref().unwrap_or(&[])
    }

    pub fn has_requirements(&self) -> bool {
        !self.requirements.is_empty()
    }
}
