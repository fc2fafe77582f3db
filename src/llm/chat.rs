use tracing::{debug, info};

use super::client::GenerationService;
use super::error::GenerationError;
use super::prompts::{
    build_gathering_prompt, build_recent_summary_prompt, build_summary_prompt, INTRODUCTION_PROMPT,
    REQUIREMENTS_COMPLETE_MARKER, SYSTEM_INSTRUCTION,
};
use crate::models::ChatMessage;

/// Assistant reply during requirements gathering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text with the completion marker removed
    pub text: String,
    /// Whether the model signalled it has enough information
    pub complete: bool,
}

impl ChatReply {
    fn from_response(response: &str) -> Self {
        if response.contains(REQUIREMENTS_COMPLETE_MARKER) {
            Self {
                text: response.replace(REQUIREMENTS_COMPLETE_MARKER, "").trim().to_string(),
                complete: true,
            }
        } else {
            Self {
                text: response.to_string(),
                complete: false,
            }
        }
    }
}

/// Gathering exchanges between automatic summaries
pub const SUMMARY_INTERVAL: usize = 5;

/// Persistent multi-turn conversation with the generation service
///
/// History is append-only; a failed call leaves it untouched.
pub struct ChatSession<'a, S: GenerationService + ?Sized> {
    service: &'a S,
    system: String,
    history: Vec<ChatMessage>,
    exchanges: usize,
}

impl<'a, S: GenerationService + ?Sized> ChatSession<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self::with_system(service, SYSTEM_INSTRUCTION)
    }

    pub fn with_system(service: &'a S, system: impl Into<String>) -> Self {
        Self {
            service,
            system: system.into(),
            history: Vec::new(),
            exchanges: 0,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Successful `gather` calls so far
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    /// True right after every [`SUMMARY_INTERVAL`]th exchange
    pub fn summary_due(&self) -> bool {
        self.exchanges > 0 && self.exchanges % SUMMARY_INTERVAL == 0
    }

    /// Send a message and record both turns
    pub async fn send(&mut self, message: &str) -> Result<String, GenerationError> {
        self.history.push(ChatMessage::user(message));

        match self.service.converse(&self.system, &self.history).await {
            Ok(reply) => {
                debug!("Chat turn {} answered", self.history.len());
                self.history.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Ask the assistant to introduce itself and pose its first question
    pub async fn introduce(&mut self) -> Result<String, GenerationError> {
        self.send(INTRODUCTION_PROMPT).await
    }

    /// Send user input with the completion check attached
    pub async fn gather(&mut self, user_input: &str) -> Result<ChatReply, GenerationError> {
        let response = self.send(&build_gathering_prompt(user_input)).await?;
        self.exchanges += 1;
        let reply = ChatReply::from_response(&response);
        if reply.complete {
            info!("Assistant reports requirements gathering complete");
        }
        Ok(reply)
    }

    /// Summarize the requirements raised across a whole conversation
    pub async fn summarize(&mut self, transcript: &str) -> Result<String, GenerationError> {
        debug!("Summarizing conversation after {} exchanges", self.exchanges);
        self.send(&build_summary_prompt(transcript)).await
    }

    /// Summarize only the latest part of a conversation
    pub async fn summarize_recent(
        &mut self,
        recent_transcript: &str,
    ) -> Result<String, GenerationError> {
        self.send(&build_recent_summary_prompt(recent_transcript)).await
    }
}
