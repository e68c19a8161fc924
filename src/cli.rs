//! Command-line arguments and command execution.

use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use legal_assistant::application::{AssistantError, CaseDetails, LegalAssistant};
use legal_assistant::config::{AppConfig, ValidationError, DEFAULT_CONFIG_FILE};
use legal_assistant::ports::AIError;
use legal_assistant::domain::document::{render_case_analysis, render_markdown, StructuredDocument};

#[derive(Parser)]
#[command(name = "legal-assistant")]
#[command(about = "General legal information from a hosted language model")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML); missing files are ignored
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print answers as JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question; omit the message for an interactive session
    Chat {
        /// Question to ask
        message: Option<String>,
    },

    /// Analyze a case description
    Analyze {
        /// Area of law, e.g. "Landlord/Tenant"
        #[arg(long)]
        case_type: String,

        /// What happened
        #[arg(long)]
        description: String,

        #[arg(long)]
        jurisdiction: Option<String>,

        /// People or organizations involved
        #[arg(long)]
        parties: Option<String>,

        #[arg(long)]
        desired_outcome: Option<String>,

        /// File the answer into issues, actions, risks and next steps
        #[arg(long)]
        buckets: bool,
    },

    /// Show configured models and governor limits
    Status,
}

/// Errors that end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Failed to initialize AI backend: {0}")]
    Setup(#[from] AIError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn user_message(&self) -> String {
        match self {
            CliError::Assistant(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Runs the parsed command.
pub async fn run(cli: Cli, config: &AppConfig) -> Result<(), CliError> {
    if let Commands::Status = cli.command {
        print_status(config);
        return Ok(());
    }

    config.validate()?;
    let assistant = LegalAssistant::from_config(config)?;
    let json = cli.json;

    match cli.command {
        Commands::Chat { message: Some(message) } => {
            let document = assistant.chat(&message).await?;
            print_document(&document, json)
        }
        Commands::Chat { message: None } => interactive(&assistant, json).await,
        Commands::Analyze {
            case_type,
            description,
            jurisdiction,
            parties,
            desired_outcome,
            buckets,
        } => {
            let case = CaseDetails {
                case_type,
                description,
                jurisdiction,
                parties,
                desired_outcome,
            };
            if buckets {
                let result = assistant.analyze_case(&case).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print!("{}", render_case_analysis(&result));
                }
                Ok(())
            } else {
                let document = assistant.analyze(&case).await?;
                print_document(&document, json)
            }
        }
        Commands::Status => Ok(()),
    }
}

/// Prints the configuration summary. Does not need a valid API key.
fn print_status(config: &AppConfig) {
    println!("Primary model:   {}", config.ai.primary_model);
    println!("Secondary model: {}", config.ai.secondary_model);
    println!(
        "API key:         {}",
        if config.ai.has_api_key() { "configured" } else { "missing" }
    );
    println!(
        "Governor:        {} ms spacing, {} requests per {} s",
        config.governor.min_interval_ms, config.governor.max_requests, config.governor.window_secs
    );
    println!("Chat history:    {} turns", config.chat.history_turns);
    if let Err(err) = config.validate() {
        println!("Configuration:   invalid ({})", err);
    } else {
        println!("Configuration:   ok");
    }
}

fn print_document(document: &StructuredDocument, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(document)?);
    } else {
        print!("{}", render_markdown(document));
    }
    Ok(())
}

/// Reads questions line by line until EOF or `/quit`. `/clear` forgets the
/// conversation. A locally rate-limited question shows a countdown and is
/// not retried.
async fn interactive(assistant: &LegalAssistant, json: bool) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt_marker()?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/clear" => {
                assistant.clear_history();
                println!("Conversation cleared.");
            }
            question => match assistant.chat(question).await {
                Ok(document) => print_document(&document, json)?,
                Err(err @ AssistantError::LocallyRateLimited { .. }) => {
                    eprintln!("{}", err.user_message());
                    countdown(assistant).await;
                }
                Err(err) => eprintln!("{}", err.user_message()),
            },
        }
        prompt_marker()?;
    }
    Ok(())
}

async fn countdown(assistant: &LegalAssistant) {
    let mut stream = Box::pin(assistant.cooldown());
    while let Some(remaining) = stream.next().await {
        if remaining == 0 {
            eprintln!("\rReady.          ");
        } else {
            eprint!("\rReady in {remaining}s ");
        }
    }
}

fn prompt_marker() -> Result<(), CliError> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}
