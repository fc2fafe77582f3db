use tracing::info;

use crate::diagram::normalize_diagrams;
use crate::llm::{build_stage_prompt, GenerationError, GenerationService};
use crate::models::{GenerationContext, Stage};

/// Separator placed between stage outputs
pub const STAGE_SEPARATOR: &str = "\n\n";

/// Configuration for staged architecture generation
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Maximum characters of each supporting document embedded in a prompt
    pub document_excerpt_chars: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            document_excerpt_chars: 2000,
        }
    }
}

/// Run a single generation stage and return its raw text
pub async fn execute_stage<S: GenerationService + ?Sized>(
    service: &S,
    stage: Stage,
    context: &GenerationContext,
    config: &StageConfig,
) -> Result<String, GenerationError> {
    let prompt = build_stage_prompt(stage, context, config.document_excerpt_chars);

    info!("{}: requesting sections {}", stage, section_range(stage));
    let output = service.generate(&prompt).await?;
    info!("{}: received {} characters", stage, output.len());

    Ok(output)
}

/// Generate the complete architecture document
///
/// Issues one request per stage, strictly in order, each carrying the full
/// shared context. Outputs are joined with a blank line and the diagrams
/// are repaired once at the end. Any stage failure aborts the whole run.
pub async fn generate_architecture<S: GenerationService + ?Sized>(
    service: &S,
    context: &GenerationContext,
    config: &StageConfig,
) -> Result<String, GenerationError> {
    info!(
        "Generating architecture in {} stages ({} requirements, {} documents, chat: {})",
        Stage::ALL.len(),
        context.requirements.len(),
        context.documents().len(),
        context.chat_transcript.is_some()
    );

    let mut outputs = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        outputs.push(execute_stage(service, stage, context, config).await?);
    }

    Ok(normalize_diagrams(&outputs.join(STAGE_SEPARATOR)))
}

fn section_range(stage: Stage) -> String {
    let sections = stage.sections();
    match (sections.first(), sections.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first.number, last.number),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{ChatMessage, Requirement, SupportingDocument};

    /// Returns canned text per call and records every prompt
    struct StubService {
        responses: Vec<String>,
        fail_on_call: Option<usize>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubService {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(|s| s.to_string()).collect(),
                fail_on_call: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationService for StubService {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            let mut prompts = self.prompts.lock().unwrap();
            let call = prompts.len();
            prompts.push(prompt.to_string());

            if self.fail_on_call == Some(call) {
                return Err(GenerationError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.responses[call % self.responses.len()].clone())
        }

        async fn converse(
            &self,
            _system: &str,
            _history: &[ChatMessage],
        ) -> Result<String, GenerationError> {
            unreachable!("stages only use single-shot generation")
        }
    }

    #[tokio::test]
    async fn test_output_is_joined_stage_text() {
        let service = StubService::new(&["## 1. Executive Summary", "## 3. Pattern", "## 8. Deploy"]);
        let context = GenerationContext::new(vec![Requirement::new("Order API")]);

        let doc = generate_architecture(&service, &context, &StageConfig::default())
            .await
            .unwrap();

        assert_eq!(doc, "## 1. Executive Summary\n\n## 3. Pattern\n\n## 8. Deploy");
        assert_eq!(service.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_output_is_normalized_after_joining() {
        let stage1 = "## 2. Architecture Diagrams\n```mermaid\ngraph TD\n    VPC --> Public Subnet\n```";
        let stage2 = "```mermaid\nWebApp[Web Application (React)]\n```";
        let stage3 = "Deploy (EKS) via CI.";
        let service = StubService::new(&[stage1, stage2, stage3]);

        let doc = generate_architecture(&service, &GenerationContext::default(), &StageConfig::default())
            .await
            .unwrap();

        let joined = [stage1, stage2, stage3].join("\n\n");
        assert_eq!(doc, normalize_diagrams(&joined));
        assert!(doc.contains("VPC --> PublicSubnet[Public Subnet]"));
        assert!(doc.contains("WebApp[Web Application - React]"));
        assert!(doc.ends_with("Deploy (EKS) via CI."));
    }

    #[tokio::test]
    async fn test_empty_context_still_runs_three_stages() {
        let service = StubService::new(&["stub"]);

        let doc = generate_architecture(&service, &GenerationContext::default(), &StageConfig::default())
            .await
            .unwrap();

        assert!(!doc.is_empty());
        let prompts = service.prompts();
        assert_eq!(prompts.len(), 3);
        for (i, prompt) in prompts.iter().enumerate() {
            assert!(prompt.contains(&format!("Part {} of 3", i + 1)));
            assert!(prompt.contains("No explicit requirements provided"));
        }
    }

    #[tokio::test]
    async fn test_every_stage_gets_shared_context() {
        let outputs = ["STAGE-ONE-TEXT", "STAGE-TWO-TEXT", "STAGE-THREE-TEXT"];
        let service = StubService::new(&outputs);
        let context = GenerationContext::new(vec![Requirement::new("Support 1000 rps")])
            .with_documents(vec![SupportingDocument::new("design.md", "Use event sourcing")])
            .with_chat_transcript("User: we like Rust");

        generate_architecture(&service, &context, &StageConfig::default())
            .await
            .unwrap();

        for prompt in service.prompts() {
            assert!(prompt.contains("1. Support 1000 rps"));
            assert!(prompt.contains("Use event sourcing"));
            assert!(prompt.contains("User: we like Rust"));
            // no stage sees another stage's output
            assert!(outputs.iter().all(|o| !prompt.contains(o)));
        }
    }

    #[tokio::test]
    async fn test_stage_failure_propagates_and_stops() {
        let mut service = StubService::new(&["ok"]);
        service.fail_on_call = Some(1);

        let err = generate_architecture(&service, &GenerationContext::default(), &StageConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Api { status: 503, .. }));
        assert_eq!(service.prompts().len(), 2);
    }

    #[test]
    fn test_section_range() {
        assert_eq!(section_range(Stage::Overview), "1-2");
        assert_eq!(section_range(Stage::Design), "3-7");
        assert_eq!(section_range(Stage::Delivery), "8-10");
    }
}
