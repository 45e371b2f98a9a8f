//! Recording store for testing sessions without a real backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use audiocall_core::error::StoreError;
use audiocall_core::model::{StoreIntent, WordProgress};
use audiocall_core::traits::WordStore;

type IntentFilter = Box<dyn Fn(&StoreIntent) -> bool + Send + Sync>;

/// A word store that records every intent it receives.
///
/// Writes can be made to fail, wholesale or for chosen intents, so callers
/// can check that a broken store never holds up the quiz and never keeps
/// half a batch.
pub struct RecordingStore {
    words: Mutex<HashMap<String, WordProgress>>,
    intents: Mutex<Vec<StoreIntent>>,
    load_count: AtomicU32,
    fail_writes: AtomicBool,
    reject: Mutex<Option<IntentFilter>>,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            words: Mutex::new(HashMap::new()),
            intents: Mutex::new(Vec::new()),
            load_count: AtomicU32::new(0),
            fail_writes: AtomicBool::new(false),
            reject: Mutex::new(None),
        }
    }

    /// Seed progress for a word before the session starts.
    pub fn with_word(self, word_id: &str, progress: WordProgress) -> Self {
        self.lock_words().insert(word_id.to_string(), progress);
        self
    }

    /// Make every subsequent write fail as unavailable.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Fail any batch that contains an intent matching `filter`.
    pub fn reject_when(&self, filter: impl Fn(&StoreIntent) -> bool + Send + Sync + 'static) {
        *self.reject.lock().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(filter));
    }

    /// Intents applied so far, in order.
    pub fn intents(&self) -> Vec<StoreIntent> {
        self.intents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn progress(&self, word_id: &str) -> Option<WordProgress> {
        self.lock_words().get(word_id).copied()
    }

    /// Number of loads made against this store.
    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::Relaxed)
    }

    fn lock_words(&self) -> std::sync::MutexGuard<'_, HashMap<String, WordProgress>> {
        self.words.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WordStore for RecordingStore {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn load(&self, word_id: &str) -> Result<Option<WordProgress>, StoreError> {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.progress(word_id))
    }

    async fn apply_all(&self, intents: &[StoreIntent]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("recording store set to fail".into()));
        }
        if let Some(filter) = self.reject.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            if let Some(rejected) = intents.iter().find(|i| filter(i)) {
                return Err(StoreError::Unavailable(format!(
                    "recording store rejected {rejected:?}"
                )));
            }
        }

        let mut words = self.lock_words();
        for intent in intents {
            if let StoreIntent::UpsertWordProgress { word_id, progress } = intent {
                words.insert(word_id.clone(), *progress);
            }
        }
        self.intents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(intents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiocall_core::model::DifficultyTag;

    #[tokio::test]
    async fn records_in_order() {
        let store = RecordingStore::new();
        let first = StoreIntent::UpsertWordProgress {
            word_id: "a".into(),
            progress: WordProgress::first_answer(true),
        };
        let second = StoreIntent::PromoteToLearned { word_id: "a".into() };
        store.apply(&first).await.unwrap();
        store.apply(&second).await.unwrap();

        assert_eq!(store.intents(), vec![first, second]);
        assert_eq!(store.progress("a").unwrap().correct_total, 1);
    }

    #[tokio::test]
    async fn rejected_batch_keeps_nothing() {
        let before = WordProgress {
            correct_streak: 4,
            ..WordProgress::with_difficulty(DifficultyTag::Hard)
        };
        let store = RecordingStore::new().with_word("a", before);
        store.reject_when(|i| matches!(i, StoreIntent::RemoveFromHard { .. }));

        let err = store
            .apply_all(&[
                StoreIntent::UpsertWordProgress {
                    word_id: "a".into(),
                    progress: WordProgress::with_difficulty(DifficultyTag::Learned),
                },
                StoreIntent::RemoveFromHard { word_id: "a".into() },
                StoreIntent::PromoteToLearned { word_id: "a".into() },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.progress("a"), Some(before));
        assert!(store.intents().is_empty());
    }

    #[tokio::test]
    async fn failing_writes_record_nothing() {
        let store = RecordingStore::new().with_word(
            "a",
            WordProgress::with_difficulty(DifficultyTag::Hard),
        );
        store.fail_writes(true);
        let err = store
            .apply(&StoreIntent::RemoveFromHard { word_id: "a".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.intents().is_empty());

        assert!(store.load("a").await.unwrap().is_some());
        assert_eq!(store.load_count(), 1);
    }
}
