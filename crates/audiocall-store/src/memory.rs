//! In-memory word store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;

use audiocall_core::error::StoreError;
use audiocall_core::model::{DifficultyTag, StoreIntent, WordProgress};
use audiocall_core::traits::WordStore;

/// Everything a user has on record: progress per word plus the hard and
/// learned collections the textbook pages list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub words: BTreeMap<String, WordProgress>,
    #[serde(default)]
    pub hard: BTreeSet<String>,
    #[serde(default)]
    pub learned: BTreeSet<String>,
}

impl StoreSnapshot {
    /// Apply a progression intent.
    pub fn apply(&mut self, intent: &StoreIntent) {
        match intent {
            StoreIntent::UpsertWordProgress { word_id, progress } => {
                self.words.insert(word_id.clone(), *progress);
            }
            StoreIntent::PromoteToLearned { word_id } => {
                self.learned.insert(word_id.clone());
            }
            StoreIntent::RemoveFromHard { word_id } => {
                self.hard.remove(word_id);
            }
        }
    }

    /// Move a word into the collection for `difficulty`, resetting its streak.
    ///
    /// This is the player's manual choice from the textbook, not a
    /// progression step, so it may move a learned word back to hard.
    pub fn mark(&mut self, word_id: &str, difficulty: DifficultyTag) -> WordProgress {
        let progress = self.words.entry(word_id.to_string()).or_default();
        progress.difficulty = difficulty;
        progress.correct_streak = 0;
        let progress = *progress;

        match difficulty {
            DifficultyTag::Hard => {
                self.learned.remove(word_id);
                self.hard.insert(word_id.to_string());
            }
            DifficultyTag::Learned => {
                self.hard.remove(word_id);
                self.learned.insert(word_id.to_string());
            }
            DifficultyTag::NewWord => {
                self.hard.remove(word_id);
                self.learned.remove(word_id);
            }
        }
        progress
    }
}

/// Word store kept entirely in memory.
pub struct MemoryWordStore {
    state: RwLock<StoreSnapshot>,
    authenticated: AtomicBool,
}

impl Default for MemoryWordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWordStore {
    /// An empty store for a signed-in user.
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    /// An empty store with nobody signed in.
    pub fn guest() -> Self {
        let store = Self::new();
        store.set_authenticated(false);
        store
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            authenticated: AtomicBool::new(true),
        }
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::Relaxed);
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    /// Mark a word as hard or learned by hand.
    #[instrument(skip(self))]
    pub async fn mark(
        &self,
        word_id: &str,
        difficulty: DifficultyTag,
    ) -> Result<WordProgress, StoreError> {
        if !self.is_authenticated() {
            return Err(StoreError::Unauthenticated);
        }
        let progress = self.state.write().await.mark(word_id, difficulty);
        tracing::info!("word {word_id} marked {difficulty}");
        Ok(progress)
    }

    pub async fn hard_words(&self) -> Vec<String> {
        self.state.read().await.hard.iter().cloned().collect()
    }

    pub async fn learned_words(&self) -> Vec<String> {
        self.state.read().await.learned.iter().cloned().collect()
    }
}

#[async_trait]
impl WordStore for MemoryWordStore {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    async fn load(&self, word_id: &str) -> Result<Option<WordProgress>, StoreError> {
        Ok(self.state.read().await.words.get(word_id).copied())
    }

    #[instrument(skip_all, fields(intents = intents.len()))]
    async fn apply_all(&self, intents: &[StoreIntent]) -> Result<(), StoreError> {
        if !self.is_authenticated() {
            return Err(StoreError::Unauthenticated);
        }
        let mut state = self.state.write().await;
        for intent in intents {
            state.apply(intent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn upsert_then_load() {
        let store = MemoryWordStore::new();
        assert!(store.load("w").await.unwrap().is_none());

        let progress = WordProgress::first_answer(true);
        store
            .apply(&StoreIntent::UpsertWordProgress {
                word_id: "w".into(),
                progress,
            })
            .await
            .unwrap();
        assert_eq!(store.load("w").await.unwrap(), Some(progress));
    }

    #[tokio::test]
    async fn promotion_moves_between_collections() {
        let store = MemoryWordStore::new();
        store.mark("w", DifficultyTag::Hard).await.unwrap();
        assert_eq!(store.hard_words().await, vec!["w".to_string()]);

        store
            .apply(&StoreIntent::RemoveFromHard { word_id: "w".into() })
            .await
            .unwrap();
        store
            .apply(&StoreIntent::PromoteToLearned { word_id: "w".into() })
            .await
            .unwrap();
        assert!(store.hard_words().await.is_empty());
        assert_eq!(store.learned_words().await, vec!["w".to_string()]);
    }

    #[tokio::test]
    async fn marking_resets_streak_keeps_totals() {
        let store = MemoryWordStore::new();
        store
            .apply(&StoreIntent::UpsertWordProgress {
                word_id: "w".into(),
                progress: WordProgress {
                    difficulty: DifficultyTag::Learned,
                    correct_streak: 2,
                    correct_total: 9,
                    incorrect_total: 1,
                },
            })
            .await
            .unwrap();
        let p = store.mark("w", DifficultyTag::Hard).await.unwrap();
        assert_eq!(p.difficulty, DifficultyTag::Hard);
        assert_eq!(p.correct_streak, 0);
        assert_eq!(p.correct_total, 9);
        assert!(store.learned_words().await.is_empty());
    }

    #[tokio::test]
    async fn batch_is_visible_all_at_once() {
        let store = Arc::new(MemoryWordStore::new());
        store.mark("w", DifficultyTag::Hard).await.unwrap();
        let promoted = WordProgress {
            difficulty: DifficultyTag::Learned,
            correct_streak: 0,
            correct_total: 5,
            incorrect_total: 0,
        };
        let batch = vec![
            StoreIntent::UpsertWordProgress {
                word_id: "w".into(),
                progress: promoted,
            },
            StoreIntent::RemoveFromHard { word_id: "w".into() },
            StoreIntent::PromoteToLearned { word_id: "w".into() },
        ];

        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..100 {
                    let snap = store.snapshot().await;
                    let learned = snap.words["w"].difficulty == DifficultyTag::Learned;
                    assert_eq!(learned, snap.learned.contains("w"));
                    assert_eq!(learned, !snap.hard.contains("w"));
                    tokio::task::yield_now().await;
                }
            })
        };
        store.apply_all(&batch).await.unwrap();
        reader.await.unwrap();

        let snap = store.snapshot().await;
        assert_eq!(snap.words["w"], promoted);
        assert!(snap.hard.is_empty());
        assert!(snap.learned.contains("w"));
    }

    #[tokio::test]
    async fn guests_cannot_write() {
        let store = MemoryWordStore::guest();
        assert!(!store.is_authenticated());
        let err = store
            .apply(&StoreIntent::PromoteToLearned { word_id: "w".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthenticated));
        assert!(matches!(
            store.mark("w", DifficultyTag::Hard).await,
            Err(StoreError::Unauthenticated)
        ));
    }
}
