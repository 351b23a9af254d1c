//! Command-line entrypoint: label organ photographs, generate a quiz, or ask a question.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use neuromap_service::config::NeuromapConfig;
use neuromap_service::error::ServiceError;
use neuromap_service::services::labeling::{self, ImageView, LabelRequest};
use neuromap_service::services::quiz::{self, QuizItem, QuizRequest};
use neuromap_service::services::{chat, Generation};
use neuromap_service::startup::Providers;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "neuromap", version, about = "Anatomy tutor powered by Gemini")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Label anatomical structures from four photographs of an organ
    Label {
        #[arg(long, default_value = labeling::DEFAULT_ORGAN)]
        organ: String,
        #[arg(long)]
        front: PathBuf,
        #[arg(long)]
        back: PathBuf,
        #[arg(long)]
        top: PathBuf,
        #[arg(long)]
        bottom: PathBuf,
        /// Defaults to LABELING_OUTPUT_DIR
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Generate a multiple-choice quiz
    Quiz {
        #[arg(long, default_value = quiz::DEFAULT_ORGAN)]
        organ: String,
        /// easy, medium or hard; anything else means medium
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// 5, 10 or 20; anything else means 10
        #[arg(long, default_value_t = quiz::DEFAULT_COUNT)]
        count: u32,
    },
    /// Ask the anatomy teacher a question
    Chat { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = NeuromapConfig::load().context("Failed to load configuration")?;
    let Some(providers) = Providers::from_config(&config)? else {
        bail!(ServiceError::Configuration);
    };

    match cli.command {
        Command::Label {
            organ,
            front,
            back,
            top,
            bottom,
            output_dir,
        } => {
            let mut views = Vec::with_capacity(labeling::VIEW_COUNT);
            for path in [&front, &back, &top, &bottom] {
                views.push(ImageView::from_path(path).await?);
            }
            let request = LabelRequest::new(&organ, views)?;

            println!("Generating {} labels...", request.organ);
            let outcome = labeling::label(providers.vision.as_ref(), &request).await?;

            let dir = output_dir.unwrap_or_else(|| config.labeling.output_dir.clone());
            let path = labeling::persist_outcome(&dir, &request.organ, &outcome)
                .await
                .with_context(|| format!("Failed to write results to {}", dir.display()))?;

            match outcome {
                Generation::Succeeded(set) => println!(
                    "Saved {} labeled parts ({} well-formed) to {}",
                    set.items.len(),
                    set.conforming,
                    path.display()
                ),
                Generation::Degraded { reason, .. } => println!(
                    "Could not parse the model response ({}). Raw text saved to {}",
                    reason,
                    path.display()
                ),
            }
        }
        Command::Quiz {
            organ,
            difficulty,
            count,
        } => {
            let request = QuizRequest::new(&organ, &difficulty, quiz::preferred_count(count));
            println!(
                "Generating a {} quiz on {} ({} questions)",
                request.difficulty, request.organ, request.count
            );

            match quiz::generate(providers.text.as_ref(), &request).await? {
                Generation::Succeeded(quiz) => print_quiz(&quiz),
                Generation::Degraded { raw, .. } => {
                    eprintln!("Model returned a non-JSON response:\n\n{}", raw);
                    bail!("quiz generation failed");
                }
            }
        }
        Command::Chat { question } => {
            let answer = chat::answer(providers.text.as_ref(), &question).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

fn print_quiz(quiz: &Value) {
    let items = match quiz {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<QuizItem>(item.clone()) {
            Ok(q) => {
                println!("Q{}. {}", i + 1, q.question);
                for option in &q.options {
                    println!("   - {}", option);
                }
                println!("Answer: {}", q.answer);
                println!("{}\n", q.explanation);
            }
            // Items are not validated; show odd ones as they came.
            Err(_) => println!("Q{}. {}\n", i + 1, item),
        }
    }
}
