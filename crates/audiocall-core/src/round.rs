//! Round controller for one audio quiz playthrough.
//!
//! Each round accepts a single answer. Answering locks input and arms the
//! reveal: once the reveal delay has passed, [`RoundController::poll_reveal`]
//! unlocks input and moves to the next question. The controller holds at most
//! one pending reveal, and `start` discards it, so a stale reveal from an
//! earlier session has nothing left to fire.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::model::{AnsweredEntry, AudioCue, Outcome, OutcomeTag, Question, NO_ANSWER};
use crate::scoring::ScoringState;
use crate::summary::SessionSummary;

/// Delay between an answer and the next round.
pub const REVEAL_DELAY: Duration = Duration::from_millis(2000);

/// Presentation view of the round on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub index: usize,
    pub total: usize,
    pub outcome: OutcomeTag,
    pub input_locked: bool,
    pub score: f64,
    pub streak: u32,
    pub finished: bool,
}

impl RoundView {
    /// View of a session that has not processed any input yet.
    pub fn starting(total: usize) -> Self {
        Self {
            index: 0,
            total,
            outcome: OutcomeTag::Pending,
            input_locked: false,
            score: 0.0,
            streak: 0,
            finished: total == 0,
        }
    }
}

/// What happened when an answer was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReceipt {
    pub outcome: Outcome,
    pub word_id: String,
    /// Points added to the score by this answer.
    pub awarded: f64,
    pub cue: AudioCue,
    /// When the next round begins.
    pub reveal_at: Instant,
}

impl AnswerReceipt {
    /// Judgement for the progression engine; `None` for timeouts.
    pub fn judgement(&self) -> Option<bool> {
        self.outcome.judgement()
    }
}

#[derive(Debug)]
pub struct RoundController {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    questions: Vec<Question>,
    index: usize,
    outcome: OutcomeTag,
    input_locked: bool,
    scoring: ScoringState,
    base_points: f64,
    streak: u32,
    best_streak: u32,
    answered: Vec<AnsweredEntry>,
    reveal_delay: Duration,
    pending_reveal: Option<Instant>,
}

impl RoundController {
    /// A controller with no questions loaded. Call [`start`](Self::start) to play.
    pub fn new(reveal_delay: Duration, base_points: f64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            questions: Vec::new(),
            index: 0,
            outcome: OutcomeTag::Pending,
            input_locked: false,
            scoring: ScoringState::new(base_points),
            base_points,
            streak: 0,
            best_streak: 0,
            answered: Vec::new(),
            reveal_delay,
            pending_reveal: None,
        }
    }

    /// Begin a new session over `questions`, discarding any pending reveal.
    pub fn start(&mut self, questions: Vec<Question>) {
        if self.pending_reveal.take().is_some() {
            tracing::debug!("discarding pending reveal of session {}", self.session_id);
        }
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.questions = questions;
        self.index = 0;
        self.outcome = OutcomeTag::Pending;
        self.input_locked = false;
        self.scoring = ScoringState::new(self.base_points);
        self.streak = 0;
        self.best_streak = 0;
        self.answered.clear();
        tracing::info!(
            "session {} started with {} questions",
            self.session_id,
            self.questions.len()
        );
    }

    /// Register an answer for the current round.
    ///
    /// Returns `None` and changes nothing while input is locked or after the
    /// last question.
    pub fn submit_answer(
        &mut self,
        choice: &str,
        word_id: &str,
        now: Instant,
    ) -> Option<AnswerReceipt> {
        if self.input_locked || self.is_finished() {
            return None;
        }
        let question = &self.questions[self.index];

        let outcome = if choice == NO_ANSWER {
            Outcome::TimedOut
        } else if question.is_answered_by(choice) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };

        let before = self.scoring.score();
        match outcome {
            Outcome::Correct => {
                self.scoring = self.scoring.on_correct();
                self.streak += 1;
                self.best_streak = self.best_streak.max(self.streak);
            }
            Outcome::Incorrect => {
                self.scoring = self.scoring.on_incorrect();
                self.streak = 0;
            }
            Outcome::TimedOut => {
                self.streak = 0;
            }
        }

        self.answered.push(AnsweredEntry::new(question, outcome));
        self.outcome = outcome.into();
        self.input_locked = true;
        let reveal_at = now + self.reveal_delay;
        self.pending_reveal = Some(reveal_at);

        tracing::debug!(
            "question {}/{} ({}) answered {:?}, score {:.2}",
            self.index + 1,
            self.questions.len(),
            question.id,
            outcome,
            self.scoring.score()
        );

        Some(AnswerReceipt {
            outcome,
            word_id: word_id.to_string(),
            awarded: self.scoring.score() - before,
            cue: AudioCue::for_outcome(outcome),
            reveal_at,
        })
    }

    /// When the pending reveal is due, if any.
    pub fn reveal_deadline(&self) -> Option<Instant> {
        self.pending_reveal
    }

    /// Advance to the next round if the pending reveal is due at `now`.
    ///
    /// Returns `true` if a new round began.
    pub fn poll_reveal(&mut self, now: Instant) -> bool {
        match self.pending_reveal {
            Some(due) if now >= due => {
                self.pending_reveal = None;
                self.input_locked = false;
                self.outcome = OutcomeTag::Pending;
                self.index = (self.index + 1).min(self.questions.len());
                true
            }
            _ => false,
        }
    }

    pub fn current_round(&self) -> RoundView {
        RoundView {
            index: self.index,
            total: self.questions.len(),
            outcome: self.outcome,
            input_locked: self.input_locked,
            score: self.scoring.score(),
            streak: self.streak,
            finished: self.is_finished(),
        }
    }

    /// The question on screen, `None` once the session is over.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn multiplier(&self) -> f64 {
        self.scoring.multiplier()
    }

    pub fn answered(&self) -> &[AnsweredEntry] {
        &self.answered
    }

    /// The end-of-session report, available once the last round has advanced.
    pub fn summary(&self, new_words_count: u32) -> Option<SessionSummary> {
        if !self.is_finished() {
            return None;
        }
        let (correct_answers, incorrect_answers) = self
            .answered
            .iter()
            .cloned()
            .partition(|e| e.outcome == Outcome::Correct);

        Some(SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            correct_answers,
            incorrect_answers,
            score: self.scoring.score(),
            best_streak: self.best_streak,
            new_words_count,
        })
    }
}
