//! TOML question deck parser.
//!
//! Loads decks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Deck, Question};

/// Number of answer buttons shown per question.
pub const CHOICES_PER_QUESTION: usize = 4;

/// Intermediate TOML structure for parsing deck files.
#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    audio_base: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    word: String,
    #[serde(default)]
    audio: String,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    translations: Vec<String>,
    #[serde(default)]
    choices: Vec<String>,
}

/// Parse a single TOML file into a `Deck`.
pub fn parse_deck(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse a TOML string into a `Deck` (useful for testing).
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<Deck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let audio_base = parsed.deck.audio_base;
    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let mut translations = q.translations;
            if let Some(t) = q.translation {
                translations.insert(0, t);
            }
            let audio = match &audio_base {
                Some(base) if !q.audio.is_empty() && !q.audio.contains("://") => {
                    format!("{}/{}", base.trim_end_matches('/'), q.audio)
                }
                _ => q.audio,
            };
            Question {
                id: q.id,
                word: q.word,
                audio,
                translations,
                choices: q.choices,
            }
        })
        .collect();

    Ok(Deck {
        id: parsed.deck.id,
        name: parsed.deck.name,
        description: parsed.deck.description,
        questions,
    })
}

/// Recursively load all `.toml` decks from a directory.
pub fn load_deck_directory(dir: &Path) -> Result<Vec<Deck>> {
    let mut decks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            decks.extend(load_deck_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck(&path) {
                Ok(deck) => decks.push(deck),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(decks)
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a deck for common issues.
///
/// Malformed questions still play; they are simply impossible to answer
/// correctly.
pub fn validate_deck(deck: &Deck) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if deck.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "deck has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &deck.questions {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message,
            })
        };

        if !seen_ids.insert(&q.id) {
            warn(format!("duplicate question ID: {}", q.id));
        }
        if q.translations.iter().all(|t| t.trim().is_empty()) {
            warn("no translation, every answer will be incorrect".into());
        }
        if q.audio.trim().is_empty() {
            warn("audio is empty".into());
        }
        if q.choices.len() != CHOICES_PER_QUESTION {
            warn(format!(
                "expected {CHOICES_PER_QUESTION} choices, found {}",
                q.choices.len()
            ));
        }
        let correct = q.choices.iter().filter(|c| q.is_answered_by(c)).count();
        match correct {
            0 => warn("no choice matches the translation".into()),
            1 => {}
            n => warn(format!("{n} choices match the translation")),
        }
    }

    warnings
}
