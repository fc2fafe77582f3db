use crate::models::{GenerationContext, Stage, SupportingDocument};

/// System instruction for requirements-gathering conversations
pub const SYSTEM_INSTRUCTION: &str = r#"You are Ada, an expert software architect and requirements analyst.
Your role is to:
1. Ask clarifying questions about user requirements
2. Understand technical and business constraints
3. Identify key stakeholders and use cases
4. Explore non-functional requirements (scalability, security, performance)

When introducing yourself, greet the user and say something like: "Hello! I'm Ada, your dedicated AI architect assistant."

CRITICAL RULE: Ask ONLY ONE question at a time.
Wait for the user's answer before asking the next question.
Keep questions simple and focused on one topic.
Never ask multiple questions in a single response."#;

/// Opening message sent to start a conversation
pub const INTRODUCTION_PROMPT: &str =
    "Please introduce yourself and ask your first question to gather software requirements.";

/// Marker the model appends once it has gathered enough information
pub const REQUIREMENTS_COMPLETE_MARKER: &str = "[REQUIREMENTS_COMPLETE]";

const COMPLETION_CHECK: &str = r#"After your response, evaluate if you have gathered enough information to create a comprehensive architecture. You should have clear understanding of:
- Project type and purpose
- Key functional requirements
- Technical constraints and preferences
- Main features and capabilities
- Non-functional requirements (scalability, security, performance)

If you have gathered sufficient information:
1. Provide a brief summary of what you've learned (3-5 bullet points covering: project type, key features, technical stack preferences, and any constraints)
2. Thank the user for the information
3. Inform them that the requirements gathering is complete
4. End your message with the exact phrase: [REQUIREMENTS_COMPLETE]

If you need more information, continue asking clarifying questions (ONE question at a time)."#;

const DIAGRAM_RULES: &str = r#"**Mermaid diagram rules - VERY IMPORTANT:**
1. Start each diagram with a markdown heading, e.g. ### System Architecture Diagram
2. On the next line open the code block with: ```mermaid
3. On the next line specify ONLY one of: graph TD, graph LR, flowchart TD, flowchart LR, sequenceDiagram
4. NEVER use C4Context, C4Container or any C4 syntax
5. Node IDs must be simple with no spaces (e.g. CDN, API, DB1)
6. Node shapes: [Rectangle] for components, [(Database)] for databases, {{Diamond}} for decisions, ([Rounded]) for start/end
7. Arrows: --> (solid), -.-> (dotted, monitoring/logging), -->|label| (labeled)
8. Subgraphs with spaces in the name: subgraph BackendServices["Backend Services"]
9. AVOID parentheses in node labels: write 'CDN - CloudFront', not 'CDN (CloudFront)'
10. Close every block with three backticks: ```

**Valid diagram example:**
### System Architecture Diagram
```mermaid
graph TD
    User[User]
    CDN[CDN - CloudFront]
    LB[Load Balancer]

    subgraph BackendServices["Backend Services"]
        API[API Gateway]
        Auth[Auth Service]
    end

    subgraph DataLayer["Data Layer"]
        DB[(PostgreSQL Database)]
        Cache[(Redis Cache)]
    end

    User -->|HTTPS| CDN
    CDN --> LB
    LB --> API
    API --> Auth
    Auth --> DB
    API --> Cache
```"#;

/// Build the context block shared by every stage prompt
///
/// Document content is cut to `excerpt_limit` characters to bound prompt size.
pub fn build_context_section(context: &GenerationContext, excerpt_limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Requirements:\n\n");
    if context.has_requirements() {
        for (i, req) in context.requirements.iter().enumerate() {
            section.push_str(&req.prompt_line(i + 1));
            section.push('\n');
        }
    } else {
        section.push_str(
            "No explicit requirements provided. Please extract and infer requirements from the chat history and supporting documents below.\n",
        );
    }

    if !context.documents().is_empty() {
        section.push_str("\n## Supporting Documents:\n\n");
        section.push_str(&format_documents(context.documents(), excerpt_limit));
    }

    if let Some(transcript) = &context.chat_transcript {
        section.push_str("\n## Requirements Gathering Discussion:\n\n```\n");
        section.push_str(transcript);
        section.push_str("\n```\n");
    }

    section
}

fn format_documents(documents: &[SupportingDocument], excerpt_limit: usize) -> String {
    let mut out = String::new();
    for doc in documents {
        out.push_str(&format!("### {} ({})\n```\n", doc.filename, doc.document_type));
        out.push_str(&doc.excerpt(excerpt_limit));
        out.push_str("\n```\n\n");
    }
    out
}

/// Build the full prompt for one generation stage
pub fn build_stage_prompt(stage: Stage, context: &GenerationContext, excerpt_limit: usize) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "# Task: Generate a Solution Architecture - Part {} of {}\n\n",
        stage.number(),
        Stage::ALL.len()
    ));
    prompt.push_str(
        "You are an expert solution architect. Based on the provided requirements and supporting documents, \
         design a complete solution architecture with detailed reasoning for each decision. \
         This document is written in parts; write ONLY the sections listed for this part.\n\n",
    );

    prompt.push_str(&build_context_section(context, excerpt_limit));

    let preceding = stage.preceding_sections();
    if !preceding.is_empty() {
        prompt.push_str("\n## Already Written (do NOT repeat these sections or their headings):\n\n");
        for section in preceding {
            prompt.push_str(&format!("- {}. {}\n", section.number, section.title));
        }
    }

    prompt.push_str("\n## Instructions:\n\n");
    prompt.push_str("Write the following sections, each under a `## N. Title` heading:\n\n");
    for section in stage.sections() {
        prompt.push_str(&format!("{}. **{}**\n", section.number, section.title));
        for point in section.points {
            prompt.push_str(&format!("   - {}\n", point));
        }
        prompt.push('\n');
    }

    if stage == Stage::Overview {
        prompt.push_str(DIAGRAM_RULES);
        prompt.push_str("\n\n");
    } else {
        prompt.push_str(
            "If you include any diagram, follow Mermaid flowchart syntax: simple node IDs without spaces and no parentheses inside node labels.\n\n",
        );
    }

    prompt.push_str("**General Format:**\n");
    prompt.push_str("- Use clear markdown headings (##, ###)\n");
    prompt.push_str("- Use bullet points and numbered lists appropriately\n");
    prompt.push_str("- Provide detailed reasoning for EVERY major decision\n");
    prompt.push_str("- Be specific about technologies and explain WHY each choice was made\n");
    prompt.push_str("- Do not add any preamble or closing remarks outside the requested sections\n");

    prompt
}

/// Build the prompt asking the model to list requirements as a JSON array
pub fn build_extraction_prompt(
    chat_transcript: Option<&str>,
    documents: &[SupportingDocument],
    excerpt_limit: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Task: Extract Software Requirements\n\n");
    prompt.push_str(
        "Analyze the conversation and documents below and extract a list of clear, structured software requirements.\n\n",
    );

    if let Some(transcript) = chat_transcript {
        prompt.push_str("## Conversation:\n\n```\n");
        prompt.push_str(transcript);
        prompt.push_str("\n```\n\n");
    }

    if !documents.is_empty() {
        prompt.push_str("## Supporting Documents:\n\n");
        prompt.push_str(&format_documents(documents, excerpt_limit));
    }

    prompt.push_str("## Output Format:\n\n");
    prompt.push_str("Respond with ONLY a JSON array. Each element must be an object with:\n");
    prompt.push_str("- \"requirement\": the requirement statement\n");
    prompt.push_str("- \"priority\": one of \"High\", \"Medium\", \"Low\"\n");
    prompt.push_str(
        "- \"category\": one of \"Functional\", \"Non-functional\", \"Technical\", \"Business\", \"Security\"\n\n",
    );
    prompt.push_str("Example:\n");
    prompt.push_str(
        "[{\"requirement\": \"Users can track orders in real time\", \"priority\": \"High\", \"category\": \"Functional\"}]\n",
    );

    prompt
}

/// Wrap user input with the completion-evaluation instruction
pub fn build_gathering_prompt(user_input: &str) -> String {
    format!("{}\n\n{}", user_input, COMPLETION_CHECK)
}

/// Ask for the key requirements of a whole conversation
pub fn build_summary_prompt(transcript: &str) -> String {
    format!(
        "Summarize the key software requirements or ideas mentioned in this conversation:\n{}",
        transcript
    )
}

/// Ask for a short bullet summary of the most recent exchanges
pub fn build_recent_summary_prompt(recent_transcript: &str) -> String {
    format!(
        "Summarize the following part of the chat in concise bullet points:\n{}",
        recent_transcript
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, Requirement};

    fn sample_context() -> GenerationContext {
        GenerationContext::new(vec![
            Requirement::new("Build a RESTful API for managing customer orders")
                .with_priority(Priority::High)
                .with_category(Category::Functional),
            Requirement::new("Deploy on AWS"),
        ])
        .with_documents(vec![SupportingDocument::new(
            "api_notes.md",
            "x".repeat(50),
        )])
        .with_chat_transcript("User: orders\nAI: noted")
    }

    #[test]
    fn test_context_section_lists_inputs() {
        let section = build_context_section(&sample_context(), 10);
        assert!(section.contains("1. Build a RESTful API for managing customer orders [High] (Functional)"));
        assert!(section.contains("2. Deploy on AWS\n"));
        assert!(section.contains("### api_notes.md (api_documentation)"));
        assert!(section.contains(&format!("{}...", "x".repeat(10))));
        assert!(!section.contains(&"x".repeat(11)));
        assert!(section.contains("User: orders\nAI: noted"));
    }

    #[test]
    fn test_empty_requirements_asks_for_inference() {
        let section = build_context_section(&GenerationContext::default(), 2000);
        assert!(section.contains("No explicit requirements provided"));
        assert!(!section.contains("## Supporting Documents"));
        assert!(!section.contains("## Requirements Gathering Discussion"));
    }

    #[test]
    fn test_stage_prompts_carry_shared_context_and_own_sections() {
        let context = sample_context();
        for stage in Stage::ALL {
            let prompt = build_stage_prompt(stage, &context, 2000);
            assert!(prompt.contains("Build a RESTful API"));
            assert!(prompt.contains(&format!("Part {} of 3", stage.number())));
            for section in stage.sections() {
                assert!(prompt.contains(&format!("{}. **{}**", section.number, section.title)));
            }
        }
    }

    #[test]
    fn test_later_stages_list_prior_titles_only() {
        let context = GenerationContext::default();
        let overview = build_stage_prompt(Stage::Overview, &context, 2000);
        assert!(!overview.contains("Already Written"));
        assert!(overview.contains("```mermaid"));

        let delivery = build_stage_prompt(Stage::Delivery, &context, 2000);
        assert!(delivery.contains("- 7. Non-Functional Requirements"));
        assert!(!delivery.contains("**Executive Summary**"));
        assert!(delivery.contains("8. **Deployment Strategy**"));
    }

    #[test]
    fn test_extraction_prompt() {
        let docs = vec![SupportingDocument::new("req.txt", "Must support SSO")];
        let prompt = build_extraction_prompt(Some("User: hi"), &docs, 5000);
        assert!(prompt.contains("User: hi"));
        assert!(prompt.contains("### req.txt (requirements)"));
        assert!(prompt.contains("ONLY a JSON array"));

        let no_chat = build_extraction_prompt(None, &docs, 5000);
        assert!(!no_chat.contains("## Conversation"));
    }

    #[test]
    fn test_summary_prompts_embed_transcript() {
        let transcript = "AI: What are you building?\nUser: A booking system";
        let full = build_summary_prompt(transcript);
        assert!(full.starts_with("Summarize the key software requirements"));
        assert!(full.ends_with(transcript));

        let recent = build_recent_summary_prompt("User: 200 rps at peak");
        assert!(recent.contains("concise bullet points:\nUser: 200 rps at peak"));
    }

    #[test]
    fn test_gathering_prompt_mentions_marker() {
        let prompt = build_gathering_prompt("We expect 50k users");
        assert!(prompt.starts_with("We expect 50k users\n\n"));
        assert!(prompt.contains(REQUIREMENTS_COMPLETE_MARKER));
    }
}
