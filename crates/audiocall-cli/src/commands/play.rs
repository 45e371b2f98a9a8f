//! The `audiocall play` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use audiocall_core::config::{load_config_from, QuizConfig};
use audiocall_core::error::SessionError;
use audiocall_core::model::{AudioCue, Question, NO_ANSWER};
use audiocall_core::session::QuizSession;
use audiocall_core::summary::SessionSummary;
use audiocall_core::traits::CueSink;
use audiocall_store::create_store;

use super::load_decks;

/// Key that answers "I don't know".
const DONT_KNOW_KEY: &str = "5";

/// Prints cues to stderr in place of a speaker.
struct TerminalCues;

impl CueSink for TerminalCues {
    fn play(&self, cue: &AudioCue) {
        match cue {
            AudioCue::Question(audio) => eprintln!("  ♪ {audio}"),
            AudioCue::Correct => eprintln!("  ✓ correct"),
            AudioCue::Incorrect => eprintln!("  ✗ incorrect"),
        }
    }
}

pub struct PlayArgs {
    pub deck: PathBuf,
    pub config: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub guest: bool,
    pub limit: Option<usize>,
    pub output: Option<PathBuf>,
    pub markdown: bool,
}

pub async fn execute(args: PlayArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if args.guest {
        config.authenticated = false;
    }

    let mut questions = load_questions(&args.deck)?;
    if let Some(limit) = args.limit {
        questions.truncate(limit);
    }
    anyhow::ensure!(!questions.is_empty(), "no questions to play in {}", args.deck.display());

    match play(config, questions).await? {
        Some(summary) => {
            if args.markdown {
                println!("{}", summary.to_markdown());
            } else {
                print_summary(&summary);
            }
            if let Some(path) = args.output {
                summary.save_json(&path)?;
                eprintln!("Summary saved to: {}", path.display());
            }
        }
        None => println!("No summary saved."),
    }
    Ok(())
}

fn load_questions(path: &Path) -> Result<Vec<Question>> {
    Ok(load_decks(path)?
        .into_iter()
        .flat_map(|d| d.questions)
        .collect())
}

/// Drive one session from stdin. `None` if input ended early.
async fn play(config: QuizConfig, questions: Vec<Question>) -> Result<Option<SessionSummary>> {
    let store = create_store(&config).context("failed to open word store")?;
    let handle = QuizSession::new(config, store, Arc::new(TerminalCues)).launch(questions.clone());
    let mut rounds = handle.rounds();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut next = 0;
    loop {
        let view = *rounds
            .wait_for(|v| v.finished || (v.index >= next && !v.input_locked))
            .await?;
        if view.finished {
            break;
        }
        let Some(question) = questions.get(view.index) else {
            break;
        };
        next = view.index;
        print_prompt(view.index, view.total, view.score, view.streak, question);

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read answer")? else {
                    break;
                };
                handle.answer(pick_choice(&line, question), question.id.clone()).await?;
            }
            _ = rounds.wait_for(|v| v.finished || v.index != next || v.input_locked) => {
                println!("Time's up.");
            }
        }
        next += 1;
    }

    match handle.finish().await {
        Ok(summary) => Ok(Some(summary)),
        Err(SessionError::Abandoned { answered, total }) => {
            println!("Session abandoned after {answered} of {total} questions.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_prompt(index: usize, total: usize, score: f64, streak: u32, question: &Question) {
    println!();
    println!(
        "Question {}/{}  (score {score:.2}, streak {streak})",
        index + 1,
        total
    );
    for (i, choice) in question.choices.iter().enumerate() {
        println!("  {}) {choice}", i + 1);
    }
    println!("  {DONT_KNOW_KEY}) I don't know");
}

/// Map a typed line to the choice it selects.
///
/// Keys 1 to 4 pick a presented choice, the don't-know key or a blank line
/// gives no answer, anything else is taken as typed.
fn pick_choice(line: &str, question: &Question) -> String {
    let input = line.trim();
    if input.is_empty() || input == DONT_KNOW_KEY {
        return NO_ANSWER.to_string();
    }
    input
        .parse::<usize>()
        .ok()
        .filter(|&n| n >= 1)
        .and_then(|n| question.choices.get(n - 1))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

fn print_summary(summary: &SessionSummary) {
    use comfy_table::{Cell, Table};

    println!();
    println!("Score: {:.2}", summary.score);
    println!("Best streak: {}", summary.best_streak);
    println!("Correct: {}", summary.correct_answers.len());
    println!("Incorrect: {}", summary.incorrect_answers.len());
    println!("No answer: {}", summary.timed_out());
    println!("Accuracy: {:.1}%", summary.accuracy() * 100.0);
    println!("New words: {}", summary.new_words_count);

    let mut table = Table::new();
    table.set_header(vec!["Word", "Translation", "Result"]);
    for entry in summary
        .correct_answers
        .iter()
        .chain(&summary.incorrect_answers)
    {
        table.add_row(vec![
            Cell::new(&entry.word),
            Cell::new(&entry.translation),
            Cell::new(format!("{:?}", entry.outcome)),
        ]);
    }
    println!("{table}");
}
