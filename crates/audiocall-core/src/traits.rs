//! Collaborator traits the quiz core is embedded with.
//!
//! The word store persists progress and owns the hard/learned collections;
//! the cue sink plays sounds. Neither is implemented here.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{AudioCue, StoreIntent, WordProgress};

// ---------------------------------------------------------------------------
// Word store
// ---------------------------------------------------------------------------

/// Persistent per-user word progress.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Whether a user is signed in. Progression is skipped when this is false.
    fn is_authenticated(&self) -> bool;

    /// Read the progress of a word, `None` if it was never answered.
    async fn load(&self, word_id: &str) -> Result<Option<WordProgress>, StoreError>;

    /// Apply the intents of one answer as a single write.
    ///
    /// Either every intent takes effect or none does; readers never observe
    /// part of a batch.
    async fn apply_all(&self, intents: &[StoreIntent]) -> Result<(), StoreError>;

    /// Apply a single intent.
    async fn apply(&self, intent: &StoreIntent) -> Result<(), StoreError> {
        self.apply_all(std::slice::from_ref(intent)).await
    }
}

// ---------------------------------------------------------------------------
// Audio cues
// ---------------------------------------------------------------------------

/// Receives audio cues. Playback itself happens elsewhere.
pub trait CueSink: Send + Sync {
    fn play(&self, cue: &AudioCue);
}

/// Cue sink that drops every cue.
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play(&self, _: &AudioCue) {}
}
