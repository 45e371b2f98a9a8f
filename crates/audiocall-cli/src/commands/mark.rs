//! The `audiocall mark` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use audiocall_core::config::load_config_from;
use audiocall_core::error::StoreError;
use audiocall_core::model::DifficultyTag;
use audiocall_store::JsonFileStore;

pub async fn execute(
    word: String,
    difficulty: DifficultyTag,
    store_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    if !config.authenticated {
        return Err(StoreError::Unauthenticated).context("sign in to mark words");
    }
    let path = store_path.unwrap_or(config.store_path);
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("failed to open word store: {}", path.display()))?;

    let progress = store
        .mark(&word, difficulty)
        .await
        .with_context(|| format!("failed to mark {word}"))?;
    println!(
        "Marked {word} as {} ({} correct, {} incorrect)",
        progress.difficulty, progress.correct_total, progress.incorrect_total
    );
    Ok(())
}
