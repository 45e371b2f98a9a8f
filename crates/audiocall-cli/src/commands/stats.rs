//! The `audiocall stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use audiocall_core::config::load_config_from;
use audiocall_store::JsonFileStore;

pub async fn execute(
    word: Option<String>,
    store_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = store_path.unwrap_or(config.store_path);
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("failed to open word store: {}", path.display()))?;
    let snapshot = store.snapshot().await;

    let mut table = Table::new();
    table.set_header(vec!["Word", "Difficulty", "Streak", "Correct", "Incorrect"]);

    let mut rows = 0;
    for (word_id, progress) in &snapshot.words {
        if word.as_ref().is_some_and(|w| w != word_id) {
            continue;
        }
        table.add_row(vec![
            Cell::new(word_id),
            Cell::new(progress.difficulty),
            Cell::new(progress.correct_streak),
            Cell::new(progress.correct_total),
            Cell::new(progress.incorrect_total),
        ]);
        rows += 1;
    }

    if let Some(word) = &word {
        anyhow::ensure!(rows > 0, "no progress recorded for {word}");
    } else if rows == 0 {
        println!("No progress recorded yet.");
        return Ok(());
    }

    println!("{table}");
    if word.is_none() {
        println!(
            "{} words, {} hard, {} learned",
            snapshot.words.len(),
            snapshot.hard.len(),
            snapshot.learned.len()
        );
    }
    Ok(())
}
