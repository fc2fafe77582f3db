use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use archgen::{
    extract_from_transcript, extract_requirements, generate_architecture, load_documents,
    load_requirements, load_transcript, normalize_diagrams_with_stats, write_requirements,
    AnthropicClient, AnthropicConfig, ArchitectureDocument, ChatSession, ExtractionConfig,
    GenerationContext, Session, StageConfig,
};
use archgen::models::render_transcript;

/// Visible messages covered by each periodic summary
const RECENT_SUMMARY_MESSAGES: usize = 10;

#[derive(Parser)]
#[command(name = "archgen")]
#[command(author, version, about = "Staged solution architecture generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a solution architecture document in three stages
    Generate {
        /// Output markdown file
        #[arg(short, long)]
        output: PathBuf,

        /// Requirements file (JSON array)
        #[arg(short, long)]
        requirements: Option<PathBuf>,

        /// Supporting document (repeatable)
        #[arg(short, long)]
        doc: Vec<PathBuf>,

        /// Requirements-gathering chat transcript
        #[arg(long)]
        chat: Option<PathBuf>,

        /// Write the document without the title and viewing header
        #[arg(long)]
        no_header: bool,

        #[command(flatten)]
        model: ModelArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Repair Mermaid diagrams in an existing markdown document
    Normalize {
        /// Input markdown file
        #[arg(short, long)]
        input: PathBuf,

        /// Output markdown file
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract structured requirements from a chat transcript and documents
    Extract {
        /// Output file (JSON array)
        #[arg(short, long)]
        output: PathBuf,

        /// Requirements-gathering chat transcript
        #[arg(long)]
        chat: Option<PathBuf>,

        /// Supporting document (repeatable)
        #[arg(short, long)]
        doc: Vec<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Gather requirements interactively over stdin
    Chat {
        /// Save the conversation transcript here
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Extract requirements from the conversation into this file
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Supporting document (repeatable)
        #[arg(short, long)]
        doc: Vec<PathBuf>,

        /// Generate the architecture document into this file afterwards
        #[arg(long)]
        architecture: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Model overrides applied on top of the environment
#[derive(Args)]
struct ModelArgs {
    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature (0-1)
    #[arg(long)]
    temperature: Option<f64>,

    /// Maximum tokens per response
    #[arg(long)]
    max_tokens: Option<u32>,
}

impl ModelArgs {
    fn client(&self) -> Result<AnthropicClient> {
        let mut config = AnthropicConfig::from_env()?;
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        info!("Using model {}", config.model);
        Ok(AnthropicClient::new(config))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            requirements,
            doc,
            chat,
            no_header,
            model,
            verbose,
        } => {
            setup_logging(verbose);
            generate(output, requirements, doc, chat, no_header, model).await
        }
        Commands::Normalize {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            normalize(&input, &output)
        }
        Commands::Extract {
            output,
            chat,
            doc,
            model,
            verbose,
        } => {
            setup_logging(verbose);
            extract(output, chat, doc, model).await
        }
        Commands::Chat {
            transcript,
            requirements,
            doc,
            architecture,
            model,
            verbose,
        } => {
            setup_logging(verbose);
            chat(transcript, requirements, doc, architecture, model).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn generate(
    output: PathBuf,
    requirements: Option<PathBuf>,
    doc: Vec<PathBuf>,
    chat: Option<PathBuf>,
    no_header: bool,
    model: ModelArgs,
) -> Result<()> {
    let requirements = match requirements {
        Some(path) => load_requirements(&path)?,
        None => Vec::new(),
    };
    let mut context = GenerationContext::new(requirements).with_documents(load_documents(&doc));
    if let Some(path) = chat {
        context = context.with_chat_transcript(load_transcript(&path)?);
    }

    let client = model.client()?;
    let text = generate_architecture(&client, &context, &StageConfig::default())
        .await
        .context("Architecture generation failed")?;

    write_architecture(&text, &output, no_header)
}

fn write_architecture(text: &str, output: &Path, no_header: bool) -> Result<()> {
    let document = if no_header {
        ArchitectureDocument::new(text)
    } else {
        ArchitectureDocument::with_viewing_header(text)
    };
    document.write_file(output)?;
    info!("Architecture written to {:?}", output);

    let metrics = document.metrics();
    info!(
        "{} headings, {} diagrams, {} words, {}/10 sections ({}%)",
        metrics.headings,
        metrics.diagrams,
        metrics.words,
        metrics.sections_found.len(),
        metrics.completeness()
    );
    let missing = metrics.missing_sections();
    if !missing.is_empty() {
        warn!("Missing sections: {}", missing.join(", "));
    }

    Ok(())
}

fn normalize(input: &Path, output: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read file: {:?}", input))?;

    let (normalized, stats) = normalize_diagrams_with_stats(&text);
    info!(
        "{} diagram block(s), {} lines: {} multi-word edges, {} bare nodes, {} label parentheses",
        stats.blocks,
        stats.diagram_lines,
        stats.multi_word_edges,
        stats.bare_nodes,
        stats.label_parentheses
    );

    std::fs::write(output, normalized)
        .with_context(|| format!("Failed to write file: {:?}", output))?;
    info!("Output written to {:?}", output);
    Ok(())
}

async fn extract(
    output: PathBuf,
    chat: Option<PathBuf>,
    doc: Vec<PathBuf>,
    model: ModelArgs,
) -> Result<()> {
    let transcript = chat.as_deref().map(load_transcript).transpose()?;
    let documents = load_documents(&doc);

    let client = model.client()?;
    let requirements = extract_from_transcript(
        &client,
        transcript.as_deref(),
        &documents,
        &ExtractionConfig::default(),
    )
    .await?;

    for (i, requirement) in requirements.iter().enumerate() {
        println!("{}", requirement.prompt_line(i + 1));
    }
    write_requirements(&output, &requirements)?;
    info!("{} requirements written to {:?}", requirements.len(), output);
    Ok(())
}

async fn chat(
    transcript_path: Option<PathBuf>,
    requirements_path: Option<PathBuf>,
    doc: Vec<PathBuf>,
    architecture_path: Option<PathBuf>,
    model: ModelArgs,
) -> Result<()> {
    let client = model.client()?;
    let mut session = Session::new();
    for document in load_documents(&doc) {
        let filename = document.filename.clone();
        if !session.add_document(document) {
            warn!("Skipping duplicate document {}", filename);
        }
    }

    let mut conversation = ChatSession::new(&client);
    let intro = conversation.introduce().await?;
    println!("Ada: {}\n", intro);
    session.record_assistant(intro);

    println!("(type 'done' when finished)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("done") {
            break;
        }

        match conversation.gather(input).await {
            Ok(reply) => {
                session.record_user(input);
                println!("\nAda: {}\n", reply.text);
                session.record_assistant(reply.text);
                if reply.complete {
                    break;
                }
            }
            Err(e) => {
                warn!("Message not sent: {}", e);
                continue;
            }
        }

        if conversation.summary_due() {
            let recent = session.recent_transcript(RECENT_SUMMARY_MESSAGES);
            match conversation.summarize_recent(&recent).await {
                Ok(summary) => {
                    println!("Summary so far:\n{}\n", summary);
                    session.add_summary(summary);
                }
                Err(e) => warn!("Summary skipped: {}", e),
            }
        }
    }
    session.chat_completed = true;

    if conversation.exchanges() > 0 {
        let transcript = render_transcript(&session.chat_history);
        match conversation.summarize(&transcript).await {
            Ok(summary) => {
                println!("Summary:\n{}\n", summary);
                session.add_summary(summary);
            }
            Err(e) => warn!("Summary skipped: {}", e),
        }
    }

    if let (Some(path), Some(text)) = (&transcript_path, session.transcript()) {
        std::fs::write(path, text).with_context(|| format!("Failed to write file: {:?}", path))?;
        info!("Transcript written to {:?}", path);
    }

    if requirements_path.is_some() || architecture_path.is_some() {
        session.requirements = extract_requirements(
            &client,
            &session.chat_history,
            &session.summaries,
            &session.supporting_docs,
            &ExtractionConfig::default(),
        )
        .await?;
        info!("{} requirements extracted", session.requirements.len());
    }

    if let Some(path) = &requirements_path {
        write_requirements(path, &session.requirements)?;
        info!("Requirements written to {:?}", path);
    }

    if let Some(path) = &architecture_path {
        if !session.can_generate() {
            warn!("Nothing to generate from: no conversation and no documents");
            return Ok(());
        }
        let text =
            generate_architecture(&client, &session.generation_context(), &StageConfig::default())
                .await
                .context("Architecture generation failed")?;
        write_architecture(&text, path, false)?;
    }

    Ok(())
}
