//! Async quiz session driver.
//!
//! Owns a [`RoundController`] inside a single task and feeds it answer
//! commands and reveal-timer expiries. Progression writes go to a background
//! worker that applies them in submission order, so a slow or failing word
//! store never holds up the round timeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::QuizConfig;
use crate::error::SessionError;
use crate::model::{AudioCue, Question, NO_ANSWER};
use crate::progression::ProgressionEngine;
use crate::round::{RoundController, RoundView};
use crate::summary::SessionSummary;
use crate::traits::{CueSink, WordStore};

/// Input accepted by a running session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// A choice picked by the player, or [`NO_ANSWER`] from an external timeout.
    Answer { choice: String, word_id: String },
    /// Throw away the current session and start over with new questions.
    Restart(Vec<Question>),
}

/// Counters gathered by the progression worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressionTally {
    pub new_words: u32,
    pub promotions: u32,
    pub failures: u32,
}

/// Serial background writer for word progress.
struct ProgressionWorker {
    tx: mpsc::UnboundedSender<(String, bool)>,
    tally: watch::Receiver<ProgressionTally>,
    handle: JoinHandle<()>,
}

impl ProgressionWorker {
    fn spawn(engine: Arc<ProgressionEngine>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, bool)>();
        let (tally_tx, tally) = watch::channel(ProgressionTally::default());
        let handle = tokio::spawn(async move {
            while let Some((word_id, was_correct)) = rx.recv().await {
                match engine.record_answer(&word_id, was_correct).await {
                    Ok(Some(transition)) => tally_tx.send_modify(|t| {
                        if transition.created() {
                            t.new_words += 1;
                        }
                        if transition.promoted() {
                            t.promotions += 1;
                        }
                    }),
                    Ok(None) => {}
                    Err(e) => {
                        tally_tx.send_modify(|t| t.failures += 1);
                        tracing::warn!("failed to record answer for {word_id}: {e}");
                    }
                }
            }
        });
        Self { tx, tally, handle }
    }

    fn submit(&self, word_id: &str, was_correct: bool) {
        if self.tx.send((word_id.to_string(), was_correct)).is_err() {
            tracing::warn!("progression worker stopped, dropping answer for {word_id}");
        }
    }

    /// Wait up to `limit` for queued writes and return the tally so far.
    ///
    /// Writes still queued after `limit` keep going in the background.
    async fn drain(self, limit: Duration) -> ProgressionTally {
        drop(self.tx);
        match tokio::time::timeout(limit, self.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("progression worker failed: {e}"),
            Err(_) => tracing::warn!(
                "word store still busy after {}ms, finishing its writes in the background",
                limit.as_millis()
            ),
        }
        let tally = *self.tally.borrow();
        tally
    }

    /// Let queued writes finish in the background without waiting for them.
    fn detach(self) {
        drop(self.tx);
        let tally = self.tally;
        let handle = self.handle;
        tokio::spawn(async move {
            match handle.await {
                Ok(()) => {
                    let tally = *tally.borrow();
                    tracing::debug!("previous session writes finished: {tally:?}");
                }
                Err(e) => tracing::error!("progression worker failed: {e}"),
            }
        });
    }
}

/// A quiz session ready to be launched.
pub struct QuizSession {
    config: QuizConfig,
    store: Arc<dyn WordStore>,
    cues: Arc<dyn CueSink>,
}

impl QuizSession {
    pub fn new(config: QuizConfig, store: Arc<dyn WordStore>, cues: Arc<dyn CueSink>) -> Self {
        Self {
            config,
            store,
            cues,
        }
    }

    /// Spawn the session on the current runtime.
    pub fn launch(self, questions: Vec<Question>) -> SessionHandle {
        let (tx, rx) = mpsc::channel(16);
        let (rounds_tx, rounds_rx) = watch::channel(RoundView::starting(questions.len()));
        let task = tokio::spawn(self.run(questions, rx, rounds_tx));
        SessionHandle {
            commands: tx,
            rounds: rounds_rx,
            task,
        }
    }

    /// Play `questions` to the end, publishing every round change on `rounds`.
    ///
    /// Returns [`SessionError::Abandoned`] if `commands` closes before the
    /// last round resolves.
    pub async fn run(
        self,
        questions: Vec<Question>,
        mut commands: mpsc::Receiver<SessionCommand>,
        rounds: watch::Sender<RoundView>,
    ) -> Result<SessionSummary, SessionError> {
        let engine = Arc::new(ProgressionEngine::new(
            Arc::clone(&self.store),
            self.config.thresholds(),
        ));
        let mut worker = ProgressionWorker::spawn(Arc::clone(&engine));
        let flush_timeout = self.config.store_flush_timeout();
        let mut controller =
            RoundController::new(self.config.reveal_delay(), self.config.base_points);
        controller.start(questions);
        let mut round_started = Instant::now();
        self.announce_round(&controller, &rounds);

        let mut commands_open = true;
        while !controller.is_finished() {
            let reveal_at = controller.reveal_deadline();
            let answer_by = match self.config.answer_time_limit() {
                Some(limit) if reveal_at.is_none() => Some(round_started + limit),
                _ => None,
            };

            if !commands_open && reveal_at.is_none() && answer_by.is_none() {
                let tally = worker.drain(flush_timeout).await;
                tracing::info!(
                    "session {} abandoned at question {} ({} new words)",
                    controller.session_id(),
                    controller.current_round().index + 1,
                    tally.new_words
                );
                return Err(SessionError::Abandoned {
                    answered: controller.answered().len(),
                    total: controller.current_round().total,
                });
            }

            tokio::select! {
                command = commands.recv(), if commands_open => match command {
                    Some(SessionCommand::Answer { choice, word_id }) => {
                        self.handle_answer(&mut controller, &worker, &choice, &word_id, &rounds);
                    }
                    Some(SessionCommand::Restart(questions)) => {
                        tracing::info!(
                            "restarting session {} ({} new words so far)",
                            controller.session_id(),
                            worker.tally.borrow().new_words
                        );
                        let previous = std::mem::replace(
                            &mut worker,
                            ProgressionWorker::spawn(Arc::clone(&engine)),
                        );
                        previous.detach();
                        controller.start(questions);
                        round_started = Instant::now();
                        self.announce_round(&controller, &rounds);
                    }
                    None => commands_open = false,
                },
                _ = sleep_until(deadline_or_never(reveal_at)), if reveal_at.is_some() => {
                    if controller.poll_reveal(Instant::now()) {
                        round_started = Instant::now();
                        self.announce_round(&controller, &rounds);
                    }
                }
                _ = sleep_until(deadline_or_never(answer_by)), if answer_by.is_some() => {
                    if let Some(word_id) = controller.current_question().map(|q| q.id.clone()) {
                        tracing::debug!("answer time limit reached for {word_id}");
                        self.handle_answer(&mut controller, &worker, NO_ANSWER, &word_id, &rounds);
                    }
                }
            }
        }

        let tally = worker.drain(flush_timeout).await;
        let summary = controller
            .summary(tally.new_words)
            .ok_or_else(|| SessionError::Aborted("session ended before the last round".into()))?;
        rounds.send_replace(controller.current_round());

        tracing::info!(
            "session {} finished: score {:.2}, {} correct, {} incorrect, best streak {}, {} new words, {} promotions, {} store failures",
            summary.session_id,
            summary.score,
            summary.correct_answers.len(),
            summary.incorrect_answers.len(),
            summary.best_streak,
            summary.new_words_count,
            tally.promotions,
            tally.failures
        );

        Ok(summary)
    }

    fn handle_answer(
        &self,
        controller: &mut RoundController,
        worker: &ProgressionWorker,
        choice: &str,
        word_id: &str,
        rounds: &watch::Sender<RoundView>,
    ) {
        let Some(receipt) = controller.submit_answer(choice, word_id, Instant::now()) else {
            tracing::debug!("ignoring answer for {word_id} while input is locked");
            return;
        };
        self.cues.play(&receipt.cue);
        if let Some(was_correct) = receipt.judgement() {
            worker.submit(word_id, was_correct);
        }
        rounds.send_replace(controller.current_round());
    }

    fn announce_round(&self, controller: &RoundController, rounds: &watch::Sender<RoundView>) {
        if let Some(question) = controller.current_question() {
            self.cues.play(&AudioCue::Question(question.audio.clone()));
        }
        rounds.send_replace(controller.current_round());
    }
}

fn deadline_or_never(at: Option<Instant>) -> Instant {
    at.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400))
}

/// Handle to a launched session.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    rounds: watch::Receiver<RoundView>,
    task: JoinHandle<Result<SessionSummary, SessionError>>,
}

impl SessionHandle {
    /// Submit the player's choice for the round on screen.
    pub async fn answer(
        &self,
        choice: impl Into<String>,
        word_id: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Answer {
            choice: choice.into(),
            word_id: word_id.into(),
        })
        .await
    }

    /// Signal that the player ran out of time.
    pub async fn time_out(&self, word_id: impl Into<String>) -> Result<(), SessionError> {
        self.answer(NO_ANSWER, word_id).await
    }

    pub async fn restart(&self, questions: Vec<Question>) -> Result<(), SessionError> {
        self.send(SessionCommand::Restart(questions)).await
    }

    /// Watch the round on screen.
    pub fn rounds(&self) -> watch::Receiver<RoundView> {
        self.rounds.clone()
    }

    /// Stop accepting input and wait for the session to resolve.
    pub async fn finish(self) -> Result<SessionSummary, SessionError> {
        drop(self.commands);
        self.task
            .await
            .map_err(|e| SessionError::Aborted(e.to_string()))?
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}
