//! The `audiocall init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("audiocall.toml").exists() {
        println!("audiocall.toml already exists, skipping.");
    } else {
        std::fs::write("audiocall.toml", SAMPLE_CONFIG)?;
        println!("Created audiocall.toml");
    }

    std::fs::create_dir_all("decks")?;
    let example_path = Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: audiocall validate --deck decks/example.toml");
    println!("  2. Run: audiocall play --deck decks/example.toml");
    println!("  3. Run: audiocall stats");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# audiocall configuration

# Pause after an answer before the next question, in milliseconds.
reveal_delay_ms = 2000
# Points for a correct answer before the streak multiplier.
base_points = 30.0
# Correct answers in a row that move a word to learned.
new_word_threshold = 3
hard_word_threshold = 5
# Uncomment to give up on a question automatically.
# answer_time_limit_secs = 10
authenticated = true
store_path = "audiocall-progress.json"
# How long the results screen waits for progress writes, in milliseconds.
store_flush_timeout_ms = 5000
"#;

const EXAMPLE_DECK: &str = r#"[deck]
id = "example"
name = "Example Deck"
description = "A few everyday words to get started"

[[questions]]
id = "example-boat"
word = "boat"
audio = "audio/boat.mp3"
translation = "лодка"
choices = ["лодка", "мост", "агент", "кот"]

[[questions]]
id = "example-bridge"
word = "bridge"
audio = "audio/bridge.mp3"
translation = "мост"
choices = ["дом", "мост", "река", "окно"]

[[questions]]
id = "example-river"
word = "river"
audio = "audio/river.mp3"
translation = "река"
choices = ["море", "лес", "река", "поле"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use audiocall_core::config::QuizConfig;
    use audiocall_core::parser::{parse_deck_str, validate_deck};

    #[test]
    fn sample_config_parses_to_defaults() {
        let config: QuizConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, QuizConfig::default());
    }

    #[test]
    fn example_deck_is_valid() {
        let deck = parse_deck_str(EXAMPLE_DECK, Path::new("decks/example.toml")).unwrap();
        assert_eq!(deck.questions.len(), 3);
        assert!(validate_deck(&deck).is_empty());
    }
}
