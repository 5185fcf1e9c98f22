//! Pipeline CLI.
//!
//! Emits one JSON progress event per line on stdout while a build or
//! refinement runs; diagnostics go to stderr. Degraded generation is not a
//! CLI failure, only host errors (config, file I/O) exit non-zero.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use builder::core::types::ProgressEvent;
use builder::io::completion::CommandCompletion;
use builder::io::config::{BuilderConfig, load_config};
use builder::logging;
use builder::orchestrator::{BuildRequest, Orchestrator};
use builder::session::Session;

#[derive(Parser)]
#[command(
    name = "builder",
    version,
    about = "Turn an app idea into a single-file web application"
)]
struct Cli {
    /// Config file (missing file means defaults).
    #[arg(long, default_value = "builder.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an application from an idea.
    Build {
        /// What to build, in plain language.
        idea: String,
        /// Review/repair cycles to allow (defaults to the config value).
        #[arg(long)]
        max_iterations: Option<u32>,
        /// Write the final document to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply a feedback round to an existing document.
    Refine {
        /// File holding the current document.
        #[arg(long)]
        input: PathBuf,
        /// The requested change, in plain language.
        feedback: String,
        /// Write the refined document to this file (defaults to `--input`).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?;

    match cli.command {
        Command::Build {
            idea,
            max_iterations,
            out,
        } => cmd_build(config, idea, max_iterations, out),
        Command::Refine {
            input,
            feedback,
            out,
        } => cmd_refine(config, input, feedback, out),
    }
}

fn cmd_build(
    config: BuilderConfig,
    idea: String,
    max_iterations: Option<u32>,
    out: Option<PathBuf>,
) -> Result<()> {
    let request = BuildRequest {
        idea,
        max_review_iterations: max_iterations.unwrap_or(config.max_review_iterations),
    };
    let orchestrator = orchestrator_from(config);
    let mut session = Session::new();

    let outcome = orchestrator.build(&mut session, &request, emit_event);

    if let Some(path) = out {
        fs::write(&path, &outcome.final_artifact.content)
            .with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

fn cmd_refine(
    config: BuilderConfig,
    input: PathBuf,
    feedback: String,
    out: Option<PathBuf>,
) -> Result<()> {
    let markup =
        fs::read_to_string(&input).with_context(|| format!("read {}", input.display()))?;
    let orchestrator = orchestrator_from(config);
    let mut session = Session::new();

    let outcome = orchestrator.refine(&mut session, &markup, &feedback, emit_event);

    let path = out.unwrap_or(input);
    fs::write(&path, &outcome.final_artifact.content)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn orchestrator_from(config: BuilderConfig) -> Orchestrator<CommandCompletion> {
    let completion = CommandCompletion::new(
        config.completion.command.clone(),
        config.completion_timeout(),
        config.completion.output_limit_bytes,
    );
    Orchestrator::new(completion, config)
}

/// One compact JSON object per event, JSONL-framed on stdout.
fn emit_event(event: ProgressEvent) {
    if let Ok(line) = serde_json::to_string(&event) {
        println!("{line}");
    }
}
