pub mod celebrate;
pub mod config;
pub mod idea;
pub mod mood;
pub mod photo;
pub mod post;
pub mod prompt;

use clap::Subcommand;
use keepsake_core::{Gateway, Store};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Commands that talk to the record store.
#[derive(Subcommand)]
pub enum RecordCommand {
    /// Record counts
    Dashboard,
    /// Poems, journal entries and written ideas
    Post {
        #[command(subcommand)]
        action: post::PostAction,
    },
    /// Daily mood tracker
    Mood {
        #[command(subcommand)]
        action: mood::MoodAction,
    },
    /// Photo gallery
    Photo {
        #[command(subcommand)]
        action: photo::PhotoAction,
    },
    /// Idea board
    Idea {
        #[command(subcommand)]
        action: idea::IdeaAction,
    },
    /// Writing prompts
    Prompt {
        #[command(subcommand)]
        action: prompt::PromptAction,
    },
}

pub async fn run_records<G: Gateway>(command: RecordCommand, store: &Store<G>) -> CliResult {
    match command {
        RecordCommand::Dashboard => print_json(&store.dashboard().await?),
        RecordCommand::Post { action } => post::run(action, store).await,
        RecordCommand::Mood { action } => mood::run(action, store).await,
        RecordCommand::Photo { action } => photo::run(action, store).await,
        RecordCommand::Idea { action } => idea::run(action, store).await,
        RecordCommand::Prompt { action } => prompt::run(action, store).await,
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read files for upload as `(file name, bytes)`.
pub fn read_files(paths: &[std::path::PathBuf]) -> Result<Vec<(String, Vec<u8>)>, Box<dyn std::error::Error>> {
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| format!("not a file: {}", path.display()))?
                .to_string();
            let bytes = std::fs::read(path)?;
            Ok((name, bytes))
        })
        .collect()
}
