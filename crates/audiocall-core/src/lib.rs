//! audiocall-core: round controller, scoring and word progression.
//!
//! This crate defines the quiz data model, the session-scoped round state
//! machine, the score multiplier and the per-word difficulty engine, plus the
//! traits through which a word store and an audio player plug in.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod progression;
pub mod round;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod traits;

pub use config::{load_config, load_config_from, QuizConfig};
pub use error::{SessionError, StoreError};
pub use model::{
    AnsweredEntry, AudioCue, Deck, DifficultyTag, Outcome, OutcomeTag, Question, StoreIntent,
    WordProgress, NO_ANSWER,
};
pub use progression::{ProgressionEngine, Thresholds, Transition};
pub use round::{AnswerReceipt, RoundController, RoundView};
pub use scoring::ScoringState;
pub use session::{QuizSession, SessionCommand, SessionHandle};
pub use summary::SessionSummary;
pub use traits::{CueSink, SilentCues, WordStore};
