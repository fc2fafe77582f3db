pub mod diagram;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use diagram::{normalize_diagrams, normalize_diagrams_with_stats, NormalizationStats};
pub use io::{
    load_document, load_documents, load_requirements, load_transcript, write_requirements,
    ArchitectureDocument, ArchitectureMetrics,
};
pub use llm::{AnthropicClient, AnthropicConfig, ChatSession, GenerationError, GenerationService};
pub use models::{
    ChatMessage, GenerationContext, Requirement, Session, Stage, SupportingDocument,
};
pub use stages::{
    extract_from_transcript, extract_requirements, generate_architecture, ExtractionConfig,
    StageConfig,
};
