//! askgpt - ask a language model tabletop questions from the terminal.
//!
//! Runs a one-shot question, an interactive chat session, or prints the
//! effective settings.

use std::io::BufRead;
use std::io::Write;
use std::io::{self};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use askgpt_config::ConfigLoader;
use askgpt_config::RequestConfig;
use askgpt_config::Settings;
use askgpt_config::settings::KNOWN_MODELS;
use askgpt_conversation::Conversation;
use askgpt_conversation::Reply;
use askgpt_conversation::ReplyFormat;

#[derive(Parser)]
#[command(name = "askgpt")]
#[command(about = "Ask a language model about your tabletop game")]
struct Cli {
    /// Settings directory (default: $ASKGPT_HOME or ~/.askgpt)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Print replies exactly as received, without HTML conversion
    #[arg(long, global = true)]
    raw: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Start an interactive chat when no command is given
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question
    Ask {
        /// The question
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Interactive chat session
    Chat,

    /// Show the effective settings
    Config,
}

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Empty,
    Exit,
    Clear,
    Threads,
    Help,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_line(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    match line {
        "/exit" | "/quit" => ReplInput::Exit,
        "/clear" => ReplInput::Clear,
        "/threads" => ReplInput::Threads,
        "/help" => ReplInput::Help,
        _ if line.starts_with('/') => ReplInput::Unknown(line),
        _ => ReplInput::Question(line),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("askgpt_conversation={default_level}").parse()?)
                .add_directive(format!("openai_sdk={default_level}").parse()?)
                .add_directive(format!("askgpt_config={default_level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let loader = match &cli.home {
        Some(home) => ConfigLoader::from_path(home),
        None => ConfigLoader::default(),
    };
    let settings = loader
        .load()
        .with_context(|| format!("failed to load settings from {}", loader.config_dir().display()))?;
    debug!(?settings, "settings loaded");

    let conversation = if cli.raw {
        Conversation::new().with_formats(ReplyFormat::PassThrough, ReplyFormat::PassThrough)
    } else {
        Conversation::new()
    };

    match cli.command {
        Some(Command::Ask { question }) => {
            let question = question.join(" ");
            cmd_ask(&conversation, &settings.request_config(), &question).await?
        }
        Some(Command::Config) => cmd_config(&loader, &settings)?,
        Some(Command::Chat) | None => run_repl(&conversation, &settings).await?,
    }

    Ok(())
}

/// Answer one question; Ctrl-C cancels the request.
async fn ask(
    conversation: &Conversation,
    config: &RequestConfig,
    question: &str,
) -> askgpt_conversation::Result<Reply> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result = conversation.respond(question, config, &cancel).await;
    watcher.abort();
    result
}

async fn cmd_ask(
    conversation: &Conversation,
    config: &RequestConfig,
    question: &str,
) -> anyhow::Result<()> {
    match ask(conversation, config, question).await {
        Ok(Reply::Message(text)) => println!("{text}"),
        Ok(Reply::Advisory(text)) => eprintln!("{text}"),
        Err(e) => {
            debug!(error = %e, "question failed");
            anyhow::bail!(e.user_message());
        }
    }
    Ok(())
}

fn cmd_config(loader: &ConfigLoader, settings: &Settings) -> anyhow::Result<()> {
    println!("Settings file: {}", loader.config_file().display());
    println!("{}", serde_json::to_string_pretty(&settings.redacted())?);

    let system = settings.game_system();
    println!("\nGame system: {} ({})", system.name, system.id);
    println!("Context length used: {}", settings.context_length());
    let route = if settings.assistant_id.trim().is_empty() {
        "chat completions"
    } else {
        "assistant threads"
    };
    println!("Mode: {} via {route}", settings.config_mode);
    if !KNOWN_MODELS.iter().any(|(id, _)| *id == settings.model) {
        println!("Note: model '{}' is not one of the listed models", settings.model);
    }
    println!("\nKnown models:");
    for (id, label) in KNOWN_MODELS {
        println!("  {id:<16} {label}");
    }
    Ok(())
}

async fn run_repl(conversation: &Conversation, settings: &Settings) -> anyhow::Result<()> {
    let config = settings.request_config();

    println!("askgpt chat ({})", settings.game_system().name);
    println!("Commands: /clear, /threads, /help, /exit. Ctrl-C cancels a pending answer.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match parse_line(&line) {
            ReplInput::Empty => continue,
            ReplInput::Exit => break,
            ReplInput::Clear => {
                conversation.reset();
                println!("History and threads cleared.");
            }
            ReplInput::Threads => println!("Cached threads: {}", conversation.thread_count()),
            ReplInput::Help => {
                println!("Type a question, or one of: /clear, /threads, /help, /exit");
            }
            ReplInput::Unknown(command) => println!("Unknown command: {command}"),
            ReplInput::Question(question) => match ask(conversation, &config, question).await {
                Ok(Reply::Message(text)) => println!("{text}\n"),
                Ok(Reply::Advisory(text)) => println!("[notice] {text}\n"),
                Err(e) => {
                    debug!(error = %e, "question failed");
                    println!("[error] {}\n", e.user_message());
                }
            },
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main.test.rs"]
mod tests;
