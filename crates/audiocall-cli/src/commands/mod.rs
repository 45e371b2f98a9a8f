use std::path::Path;

use anyhow::Result;

use audiocall_core::model::Deck;
use audiocall_core::parser;

pub mod init;
pub mod mark;
pub mod play;
pub mod stats;
pub mod validate;

/// Load one deck file, or every deck in a directory.
pub(crate) fn load_decks(path: &Path) -> Result<Vec<Deck>> {
    let decks = if path.is_dir() {
        parser::load_deck_directory(path)?
    } else {
        vec![parser::parse_deck(path)?]
    };
    for deck in &decks {
        tracing::debug!("loaded deck {} ({} questions)", deck.id, deck.questions.len());
    }
    Ok(decks)
}
