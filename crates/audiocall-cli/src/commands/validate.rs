//! The `audiocall validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use audiocall_core::parser::validate_deck;

use super::load_decks;

pub fn execute(deck_path: PathBuf) -> Result<()> {
    let decks = load_decks(&deck_path)?;
    let mut flagged = 0;

    for deck in &decks {
        println!("{} [{}]: {} questions", deck.name, deck.id, deck.questions.len());

        let warnings = validate_deck(deck);
        if warnings.is_empty() {
            continue;
        }
        flagged += warnings.len();

        let mut table = Table::new();
        table.set_header(vec!["Question", "Problem"]);
        for w in &warnings {
            table.add_row(vec![
                Cell::new(w.question_id.as_deref().unwrap_or("(deck)")),
                Cell::new(&w.message),
            ]);
        }
        println!("{table}");
    }

    if flagged == 0 {
        println!("All decks playable.");
    } else {
        println!("{flagged} problem(s) in {} deck(s).", decks.len());
    }
    Ok(())
}
