//! End-of-session report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnsweredEntry, Outcome};

/// Everything the results screen shows after the last question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rounds answered correctly, in play order.
    pub correct_answers: Vec<AnsweredEntry>,
    /// Rounds answered incorrectly or timed out, in play order.
    pub incorrect_answers: Vec<AnsweredEntry>,
    pub score: f64,
    pub best_streak: u32,
    /// Words tracked for the first time during this session.
    pub new_words_count: u32,
}

impl SessionSummary {
    pub fn total_answered(&self) -> usize {
        self.correct_answers.len() + self.incorrect_answers.len()
    }

    /// Share of correct answers, 0.0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_answered();
        if total == 0 {
            0.0
        } else {
            self.correct_answers.len() as f64 / total as f64
        }
    }

    pub fn timed_out(&self) -> usize {
        self.incorrect_answers
            .iter()
            .filter(|e| e.outcome == Outcome::TimedOut)
            .count()
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// Render as a markdown results table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("## Audio-call results\n\n");
        md.push_str(&format!(
            "Score: **{:.2}** · best streak: **{}** · new words: **{}**\n\n",
            self.score, self.best_streak, self.new_words_count
        ));
        md.push_str("| Word | Translation | Result |\n|---|---|---|\n");

        let mut entries: Vec<&AnsweredEntry> = self
            .correct_answers
            .iter()
            .chain(&self.incorrect_answers)
            .collect();
        entries.sort_by_key(|e| e.outcome != Outcome::Correct);
        for e in entries {
            let result = match e.outcome {
                Outcome::Correct => "correct",
                Outcome::Incorrect => "incorrect",
                Outcome::TimedOut => "no answer",
            };
            md.push_str(&format!("| {} | {} | {} |\n", e.word, e.translation, result));
        }
        md
    }
}
