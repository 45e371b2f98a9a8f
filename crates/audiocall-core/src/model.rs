//! Core data model types for audiocall.
//!
//! Questions and decks are immutable inputs; word progress and store intents
//! describe what the progression engine hands to the word store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Choice text submitted when the player did not answer in time.
pub const NO_ANSWER: &str = "noAnswer";

/// A single audio question: the player hears `audio` and picks the translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Word identifier in the word store.
    pub id: String,
    /// The word being asked.
    pub word: String,
    /// Audio reference (relative path or URL) for the spoken word.
    pub audio: String,
    /// Accepted translations. An empty list makes every answer incorrect.
    #[serde(default)]
    pub translations: Vec<String>,
    /// The presented answer choices, one of them correct.
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Question {
    /// Whether `choice` names one of this question's translations.
    ///
    /// A choice matches when it contains a non-blank translation, so labels
    /// such as `"2 алкоголь"` still count.
    pub fn is_answered_by(&self, choice: &str) -> bool {
        self.translations
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .any(|t| choice.contains(t))
    }

    /// The translation shown on the results screen.
    pub fn display_translation(&self) -> String {
        self.translations.join(", ")
    }
}

/// A named collection of questions loaded from a deck file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

/// How a single answered round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl Outcome {
    /// The judgement handed to the progression engine. Timeouts are abstentions.
    pub fn judgement(self) -> Option<bool> {
        match self {
            Outcome::Correct => Some(true),
            Outcome::Incorrect => Some(false),
            Outcome::TimedOut => None,
        }
    }
}

/// Per-round outcome tag shown while a round is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    #[default]
    Pending,
    Correct,
    Incorrect,
    TimedOut,
}

impl From<Outcome> for OutcomeTag {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => OutcomeTag::Correct,
            Outcome::Incorrect => OutcomeTag::Incorrect,
            Outcome::TimedOut => OutcomeTag::TimedOut,
        }
    }
}

/// One line of the answered log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredEntry {
    pub question_id: String,
    pub word: String,
    pub audio: String,
    pub translation: String,
    pub outcome: Outcome,
}

impl AnsweredEntry {
    pub fn new(question: &Question, outcome: Outcome) -> Self {
        Self {
            question_id: question.id.clone(),
            word: question.word.clone(),
            audio: question.audio.clone(),
            translation: question.display_translation(),
            outcome,
        }
    }
}

/// Mastery tag of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyTag {
    #[default]
    NewWord,
    Hard,
    Learned,
}

impl fmt::Display for DifficultyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyTag::NewWord => write!(f, "newWord"),
            DifficultyTag::Hard => write!(f, "hard"),
            DifficultyTag::Learned => write!(f, "learned"),
        }
    }
}

impl FromStr for DifficultyTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newword" | "new" => Ok(DifficultyTag::NewWord),
            "hard" => Ok(DifficultyTag::Hard),
            "learned" => Ok(DifficultyTag::Learned),
            _ => Err(format!("unknown difficulty: {s}")),
        }
    }
}

/// Per-user progress of a single word, owned by the word store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordProgress {
    pub difficulty: DifficultyTag,
    /// Consecutive correct answers for this word across sessions.
    pub correct_streak: u32,
    /// Lifetime correct answers.
    pub correct_total: u32,
    /// Lifetime incorrect answers.
    pub incorrect_total: u32,
}

impl WordProgress {
    /// Progress for a word answered for the first time.
    pub fn first_answer(was_correct: bool) -> Self {
        Self {
            difficulty: DifficultyTag::NewWord,
            correct_streak: u32::from(was_correct),
            correct_total: u32::from(was_correct),
            incorrect_total: u32::from(!was_correct),
        }
    }

    pub fn with_difficulty(difficulty: DifficultyTag) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

/// A change the word store is asked to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreIntent {
    /// Insert or replace the progress record of a word.
    UpsertWordProgress {
        word_id: String,
        progress: WordProgress,
    },
    /// Add a word to the learned collection.
    PromoteToLearned { word_id: String },
    /// Drop a word from the hard collection.
    RemoveFromHard { word_id: String },
}

impl StoreIntent {
    pub fn word_id(&self) -> &str {
        match self {
            StoreIntent::UpsertWordProgress { word_id, .. }
            | StoreIntent::PromoteToLearned { word_id }
            | StoreIntent::RemoveFromHard { word_id } => word_id,
        }
    }
}

/// An audio cue the embedding application should play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", content = "audio", rename_all = "snake_case")]
pub enum AudioCue {
    Correct,
    Incorrect,
    /// The spoken word of the round that just began.
    Question(String),
}

impl AudioCue {
    pub fn for_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => AudioCue::Correct,
            Outcome::Incorrect | Outcome::TimedOut => AudioCue::Incorrect,
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCue::Correct => write!(f, "correct"),
            AudioCue::Incorrect => write!(f, "incorrect"),
            AudioCue::Question(audio) => write!(f, "{audio}"),
        }
    }
}
