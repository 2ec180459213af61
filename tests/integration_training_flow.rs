// Headless end-to-end coverage of the core: analysis feeding the pacer,
// the runner driving a session with live control commands, and an
// assessment folding its score into the same stats object.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use reable::analysis::{analyze, tokenize};
use reable::assessment::AssessmentEngine;
use reable::battery::BatterySet;
use reable::error::CoreError;
use reable::pacer::{Pacer, Tick};
use reable::runtime::{PacerCommand, Runner, StepOutcome, TestCommandSource};
use reable::session::ReadingStats;
use reable::settings::ReaderSettings;

const PASSAGE: &str = "The tide came in slowly. Boats rocked against the pier. \
Gulls circled overhead and the town woke up.";

fn fast_settings() -> ReaderSettings {
    ReaderSettings {
        wpm: 1000, // 60ms per word
        pause_at_punctuation: false,
        ..Default::default()
    }
}

#[test]
fn analysis_output_feeds_the_pacer() {
    let analysis = analyze(PASSAGE);
    assert_eq!(analysis.stats.sentence_count, 3);
    assert!(analysis.stats.word_count > 0);
    assert!(analysis.readability.flesch_score > 0);

    let words = tokenize(PASSAGE);
    assert_eq!(words.len(), analysis.stats.word_count);

    // Deterministic run with synthetic time: every word advances once,
    // then the run stops itself at 100%.
    let mut pacer = Pacer::new();
    let mut stats = ReadingStats::new();
    let t0 = Instant::now();
    let total = words.len();
    pacer.start(words, fast_settings(), t0).unwrap();

    let mut advances = 0;
    let mut now = t0;
    loop {
        now += Duration::from_millis(60);
        match pacer.poll(now, &mut stats) {
            Some(Tick::Advanced) => advances += 1,
            Some(Tick::Completed) => break,
            None => panic!("tick was due but did not fire"),
        }
    }

    assert_eq!(advances, total - 1);
    assert_eq!(pacer.state().progress_percent, 100.0);
    assert_eq!(stats.words_read, total);
    assert_eq!(stats.sessions_completed, 1);
    assert_eq!(stats.average_wpm, 1000.0);
}

#[test]
fn empty_text_cannot_start_a_session() {
    let mut pacer = Pacer::new();
    let err = pacer.start(tokenize("   \n "), fast_settings(), Instant::now());
    assert_eq!(err, Err(CoreError::InvalidState("cannot start with empty text")));
}

#[test]
fn runner_session_survives_pause_and_resume() {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::with_fallback(TestCommandSource::new(rx), Duration::from_millis(10));
    let mut pacer = Pacer::new();
    let mut stats = ReadingStats::new();

    tx.send(PacerCommand::Start {
        words: tokenize("one two three four five"),
        settings: fast_settings(),
    })
    .unwrap();
    assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Applied);

    // Let a couple of words play out.
    let mut advances = 0;
    while advances < 2 {
        if let StepOutcome::Advanced(_) = runner.step(&mut pacer, &mut stats) {
            advances += 1;
        }
    }
    let paused_at = pacer.state().word_index;

    // Pause preempts the pending tick; position holds while paused.
    tx.send(PacerCommand::TogglePlayPause).unwrap();
    assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Applied);
    assert!(!pacer.state().is_playing);
    thread::sleep(Duration::from_millis(150));
    assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Idle);
    assert_eq!(pacer.state().word_index, paused_at);

    // Resume and play out; no word is skipped or repeated.
    tx.send(PacerCommand::TogglePlayPause).unwrap();
    assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Applied);
    loop {
        match runner.step(&mut pacer, &mut stats) {
            StepOutcome::Advanced(_) => advances += 1,
            StepOutcome::Completed => break,
            StepOutcome::Idle => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(advances, 4);
    assert_eq!(stats.words_read, 5);
}

#[test]
fn pacing_and_assessment_share_one_stats_object() {
    let mut stats = ReadingStats::new();

    // A completed pacing session.
    let mut pacer = Pacer::new();
    let t0 = Instant::now();
    pacer.start(tokenize("a b"), fast_settings(), t0).unwrap();
    pacer.poll(t0 + Duration::from_millis(60), &mut stats);
    pacer.poll(t0 + Duration::from_millis(120), &mut stats);
    assert_eq!(stats.sessions_completed, 1);

    // A finished assessment on the same stats.
    let mut engine = AssessmentEngine::new(BatterySet::builtin());
    engine.start_test("basic-comprehension").unwrap();
    let answers: Vec<usize> = engine
        .session()
        .unwrap()
        .items
        .iter()
        .map(|item| item.correct_answer)
        .collect();
    for (i, answer) in answers.iter().enumerate() {
        engine.answer(i, *answer).unwrap();
    }
    let results = engine.finish(&mut stats).unwrap();

    assert_eq!(results.overall_score, 100.0);
    assert_eq!(stats.comprehension_score, 100.0);
    assert_eq!(stats.accuracy, 100.0);
    assert_eq!(stats.sessions_completed, 1);
    assert_eq!(stats.assessments_completed, 1);
}
