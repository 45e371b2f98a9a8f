//! Word difficulty progression.
//!
//! | tag      | correct                               | incorrect        |
//! |----------|---------------------------------------|------------------|
//! | untracked| create newWord, streak 1              | create, streak 0 |
//! | newWord  | streak + 1, learned at the new-word threshold | streak 0 |
//! | hard     | streak + 1, learned at the hard threshold     | streak 0 |
//! | learned  | counters only                         | counters only    |
//!
//! Promotion resets the streak and emits `PromoteToLearned`; graduating from
//! the hard track also emits `RemoveFromHard`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{DifficultyTag, StoreIntent, WordProgress};
use crate::traits::WordStore;

/// Correct-streak lengths that promote a word to learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub new_word: u32,
    pub hard: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            new_word: 3,
            hard: 5,
        }
    }
}

/// Result of applying one judged answer to a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub word_id: String,
    pub previous: Option<WordProgress>,
    pub progress: WordProgress,
    /// Intents for the word store, in the order they must be applied.
    pub intents: Vec<StoreIntent>,
}

impl Transition {
    /// The word had no progress record before this answer.
    pub fn created(&self) -> bool {
        self.previous.is_none()
    }

    /// This answer moved the word to learned.
    pub fn promoted(&self) -> bool {
        self.intents
            .iter()
            .any(|i| matches!(i, StoreIntent::PromoteToLearned { .. }))
    }
}

/// Compute the next progress of a word. Pure; touches no store.
pub fn transition(
    word_id: &str,
    current: Option<WordProgress>,
    was_correct: bool,
    thresholds: Thresholds,
) -> Transition {
    let Some(mut progress) = current else {
        return Transition {
            word_id: word_id.to_string(),
            previous: None,
            progress: WordProgress::first_answer(was_correct),
            intents: vec![StoreIntent::UpsertWordProgress {
                word_id: word_id.to_string(),
                progress: WordProgress::first_answer(was_correct),
            }],
        };
    };

    if was_correct {
        progress.correct_total = progress.correct_total.saturating_add(1);
    } else {
        progress.incorrect_total = progress.incorrect_total.saturating_add(1);
    }

    let threshold = match progress.difficulty {
        DifficultyTag::NewWord => Some(thresholds.new_word),
        DifficultyTag::Hard => Some(thresholds.hard),
        DifficultyTag::Learned => None,
    };

    let mut graduated_from = None;
    if let Some(threshold) = threshold {
        if was_correct {
            progress.correct_streak = progress.correct_streak.saturating_add(1);
            if progress.correct_streak >= threshold {
                graduated_from = Some(progress.difficulty);
                progress.difficulty = DifficultyTag::Learned;
                progress.correct_streak = 0;
            }
        } else {
            progress.correct_streak = 0;
        }
    }

    let mut intents = vec![StoreIntent::UpsertWordProgress {
        word_id: word_id.to_string(),
        progress,
    }];
    if let Some(from) = graduated_from {
        if from == DifficultyTag::Hard {
            intents.push(StoreIntent::RemoveFromHard {
                word_id: word_id.to_string(),
            });
        }
        intents.push(StoreIntent::PromoteToLearned {
            word_id: word_id.to_string(),
        });
    }

    Transition {
        word_id: word_id.to_string(),
        previous: current,
        progress,
        intents,
    }
}

/// Reads a word from the store, computes its transition and writes it back.
pub struct ProgressionEngine {
    store: Arc<dyn WordStore>,
    thresholds: Thresholds,
}

impl ProgressionEngine {
    pub fn new(store: Arc<dyn WordStore>, thresholds: Thresholds) -> Self {
        Self { store, thresholds }
    }

    /// Record a judged answer.
    ///
    /// Returns `Ok(None)` without touching the store when no user is signed in.
    pub async fn record_answer(
        &self,
        word_id: &str,
        was_correct: bool,
    ) -> Result<Option<Transition>, StoreError> {
        if !self.store.is_authenticated() {
            tracing::debug!("guest session, skipping progression for {word_id}");
            return Ok(None);
        }

        let current = self.store.load(word_id).await?;
        let transition = transition(word_id, current, was_correct, self.thresholds);

        self.store.apply_all(&transition.intents).await?;

        if transition.promoted() {
            tracing::info!(
                "word {} promoted to learned after {} correct answers",
                word_id,
                transition.progress.correct_total
            );
        } else {
            tracing::debug!(
                "word {} now {} (streak {})",
                word_id,
                transition.progress.difficulty,
                transition.progress.correct_streak
            );
        }

        Ok(Some(transition))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::traits::testing::TestStore;

    fn step(current: Option<WordProgress>, correct: bool) -> Transition {
        transition("w", current, correct, Thresholds::default())
    }

    fn hard() -> WordProgress {
        WordProgress::with_difficulty(DifficultyTag::Hard)
    }

    #[test]
    fn untracked_word_is_created_as_new() {
        let t = step(None, true);
        assert!(t.created());
        assert_eq!(t.progress.difficulty, DifficultyTag::NewWord);
        assert_eq!(t.progress.correct_streak, 1);
        assert_eq!(t.intents.len(), 1);

        let t = step(None, false);
        assert_eq!(t.progress.correct_streak, 0);
        assert_eq!(t.progress.incorrect_total, 1);
    }

    #[test]
    fn three_correct_answers_learn_a_new_word() {
        let first = step(None, true);
        assert_eq!(first.progress.difficulty, DifficultyTag::NewWord);
        let second = step(Some(first.progress), true);
        assert_eq!(second.progress.difficulty, DifficultyTag::NewWord);
        assert_eq!(second.progress.correct_streak, 2);
        let third = step(Some(second.progress), true);
        assert_eq!(third.progress.difficulty, DifficultyTag::Learned);
        assert_eq!(third.progress.correct_streak, 0);
        assert_eq!(third.progress.correct_total, 3);
        assert!(third.promoted());
        assert_eq!(
            third.intents[1],
            StoreIntent::PromoteToLearned {
                word_id: "w".into()
            }
        );
        assert!(!third
            .intents
            .iter()
            .any(|i| matches!(i, StoreIntent::RemoveFromHard { .. })));
    }

    #[test]
    fn mistake_resets_new_word_streak() {
        let mut p = step(None, true).progress;
        p = step(Some(p), true).progress;
        let t = step(Some(p), false);
        assert_eq!(t.progress.correct_streak, 0);
        assert_eq!(t.progress.difficulty, DifficultyTag::NewWord);
        assert_eq!(t.progress.incorrect_total, 1);
        assert!(!t.promoted());
    }

    #[test]
    fn hard_word_mistake_after_four_keeps_it_hard() {
        let mut p = hard();
        for expected in 1..=4 {
            p = step(Some(p), true).progress;
            assert_eq!(p.correct_streak, expected);
            assert_eq!(p.difficulty, DifficultyTag::Hard);
        }
        let t = step(Some(p), false);
        assert_eq!(t.progress.correct_streak, 0);
        assert_eq!(t.progress.difficulty, DifficultyTag::Hard);
        assert_eq!(t.progress.correct_total, 4);
    }

    #[test]
    fn five_correct_graduate_a_hard_word_once() {
        let mut p = hard();
        let mut promotions = Vec::new();
        for _ in 0..5 {
            let t = step(Some(p), true);
            p = t.progress;
            promotions.extend(t.intents.into_iter().skip(1));
        }
        assert_eq!(p.difficulty, DifficultyTag::Learned);
        assert_eq!(p.correct_streak, 0);
        assert_eq!(
            promotions,
            vec![
                StoreIntent::RemoveFromHard {
                    word_id: "w".into()
                },
                StoreIntent::PromoteToLearned {
                    word_id: "w".into()
                },
            ]
        );
    }

    #[test]
    fn hard_track_needs_longer_streak_than_new_words() {
        let mut p = hard();
        for _ in 0..3 {
            p = step(Some(p), true).progress;
        }
        assert_eq!(p.difficulty, DifficultyTag::Hard);
    }

    #[test]
    fn learned_words_only_count() {
        let learned = WordProgress {
            difficulty: DifficultyTag::Learned,
            correct_streak: 0,
            correct_total: 7,
            incorrect_total: 1,
        };
        let t = step(Some(learned), false);
        assert_eq!(t.progress.difficulty, DifficultyTag::Learned);
        assert_eq!(t.progress.correct_streak, 0);
        assert_eq!(t.progress.incorrect_total, 2);

        let t = step(Some(t.progress), true);
        assert_eq!(t.progress.difficulty, DifficultyTag::Learned);
        assert_eq!(t.progress.correct_total, 8);
        assert_eq!(t.intents.len(), 1);
    }

    #[test]
    fn counters_saturate_instead_of_overflowing() {
        let worn = WordProgress {
            difficulty: DifficultyTag::Learned,
            correct_streak: 0,
            correct_total: u32::MAX,
            incorrect_total: u32::MAX,
        };
        assert_eq!(step(Some(worn), true).progress.correct_total, u32::MAX);
        assert_eq!(step(Some(worn), false).progress.incorrect_total, u32::MAX);

        let stuck = WordProgress {
            difficulty: DifficultyTag::Hard,
            correct_streak: u32::MAX,
            correct_total: 0,
            incorrect_total: 0,
        };
        let thresholds = Thresholds {
            new_word: 3,
            hard: u32::MAX,
        };
        let t = transition("w", Some(stuck), true, thresholds);
        assert_eq!(t.progress.difficulty, DifficultyTag::Learned);
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = Thresholds {
            new_word: 2,
            hard: 2,
        };
        let p = transition("w", None, true, thresholds).progress;
        let t = transition("w", Some(p), true, thresholds);
        assert!(t.promoted());
    }

    #[tokio::test]
    async fn engine_applies_intents_in_order() {
        let store = Arc::new(TestStore::with_word(
            "w",
            WordProgress {
                correct_streak: 4,
                ..hard()
            },
        ));
        let engine = ProgressionEngine::new(store.clone(), Thresholds::default());

        let t = engine.record_answer("w", true).await.unwrap().unwrap();
        assert!(t.promoted());

        let intents = store.intents();
        assert_eq!(intents.len(), 3);
        assert!(matches!(intents[0], StoreIntent::UpsertWordProgress { .. }));
        assert!(matches!(intents[1], StoreIntent::RemoveFromHard { .. }));
        assert!(matches!(intents[2], StoreIntent::PromoteToLearned { .. }));
        assert_eq!(
            store.progress("w").unwrap().difficulty,
            DifficultyTag::Learned
        );
    }

    #[tokio::test]
    async fn promotion_is_written_all_or_nothing() {
        let before = WordProgress {
            correct_streak: 4,
            correct_total: 4,
            ..hard()
        };
        let store = Arc::new(TestStore::with_word("w", before));
        store.reject_remove_from_hard.store(true, Ordering::Relaxed);
        let engine = ProgressionEngine::new(store.clone(), Thresholds::default());

        assert!(engine.record_answer("w", true).await.is_err());
        assert_eq!(store.progress("w"), Some(before));
        assert!(store.intents().is_empty());
    }

    #[tokio::test]
    async fn engine_skips_guests() {
        let store = Arc::new(TestStore::default());
        store.guest.store(true, Ordering::Relaxed);
        let engine = ProgressionEngine::new(store.clone(), Thresholds::default());

        assert!(engine.record_answer("w", true).await.unwrap().is_none());
        assert!(store.intents().is_empty());
    }

    #[tokio::test]
    async fn engine_surfaces_store_failures() {
        let store = Arc::new(TestStore::default());
        store.fail_writes.store(true, Ordering::Relaxed);
        let engine = ProgressionEngine::new(store.clone(), Thresholds::default());

        let err = engine.record_answer("w", true).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
