use criterion::{black_box, criterion_group, criterion_main, Criterion};

use audiocall_core::model::{DifficultyTag, Question, WordProgress};
use audiocall_core::progression::{transition, Thresholds};
use audiocall_core::round::{RoundController, REVEAL_DELAY};
use audiocall_core::scoring::ScoringState;
use tokio::time::Instant;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("w{i}"),
            word: format!("word{i}"),
            audio: format!("files/{i}.mp3"),
            translations: vec![format!("right{i}")],
            choices: vec![
                format!("right{i}"),
                "wrong-a".into(),
                "wrong-b".into(),
                "wrong-c".into(),
            ],
        })
        .collect()
}

fn bench_scoring(c: &mut Criterion) {
    c.bench_function("scoring_100_answers", |b| {
        b.iter(|| {
            let mut s = ScoringState::default();
            for i in 0..100 {
                s = if i % 4 == 0 { s.on_incorrect() } else { s.on_correct() };
            }
            black_box(s.score())
        })
    });
}

fn bench_progression(c: &mut Criterion) {
    let hard = WordProgress::with_difficulty(DifficultyTag::Hard);
    c.bench_function("hard_word_graduation", |b| {
        b.iter(|| {
            let mut p = Some(hard);
            for _ in 0..5 {
                p = Some(transition("w", p, true, Thresholds::default()).progress);
            }
            black_box(p)
        })
    });
}

fn bench_round_controller(c: &mut Criterion) {
    let questions = make_questions(20);
    c.bench_function("controller_20_rounds", |b| {
        b.iter(|| {
            let mut controller = RoundController::new(REVEAL_DELAY, 30.0);
            controller.start(questions.clone());
            let mut now = Instant::now();
            for i in 0..20 {
                let choice = if i % 3 == 0 { "wrong-a".to_string() } else { format!("right{i}") };
                controller.submit_answer(&choice, &format!("w{i}"), now);
                now += REVEAL_DELAY;
                controller.poll_reveal(now);
            }
            black_box(controller.summary(0))
        })
    });
}

criterion_group!(
    benches,
    bench_scoring,
    bench_progression,
    bench_round_controller
);
criterion_main!(benches);
