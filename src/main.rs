use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use reable::analysis::{analyze, tokenize, TextAnalysis};
use reable::assessment::AssessmentEngine;
use reable::battery::BatterySet;
use reable::pacer::Pacer;
use reable::runtime::{IdleCommandSource, Runner, StepOutcome};
use reable::session::ReadingStats;
use reable::settings::{FileSettingsStore, ReaderSettings, SettingsStore};

/// speed reading trainer: analyze text, pace it word by word, test comprehension
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Analyzes plain text for readability, optionally plays it back one word \
at a time at a configurable pace, and runs multiple-choice comprehension assessments."
)]
struct Cli {
    /// text file to read; stdin is used when omitted
    file: Option<PathBuf>,

    /// words per minute for the paced display
    #[clap(short = 'w', long)]
    wpm: Option<u32>,

    /// preferred font size, stored with the settings for GUI shells
    #[clap(long)]
    font_size: Option<u32>,

    /// do not hold sentence-ending words longer
    #[clap(long)]
    no_punctuation_pause: bool,

    /// play the text back word by word after analyzing it
    #[clap(short, long)]
    pace: bool,

    /// list the available assessment batteries and exit
    #[clap(long)]
    list_batteries: bool,

    /// run the assessment battery with this id
    #[clap(short, long)]
    battery: Option<String>,

    /// load batteries from a JSON file instead of the built-in set
    #[clap(long)]
    batteries_file: Option<PathBuf>,

    /// persist the effective settings for future runs
    #[clap(long)]
    save: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileSettingsStore::new();
    let mut settings = store.load();
    if let Some(wpm) = cli.wpm {
        settings.wpm = wpm;
    }
    if let Some(font_size) = cli.font_size {
        settings.font_size = font_size;
    }
    if cli.no_punctuation_pause {
        settings.pause_at_punctuation = false;
    }
    let settings = settings.clamped();
    if cli.save {
        store.save(&settings)?;
    }

    let batteries = match &cli.batteries_file {
        Some(path) => BatterySet::from_json_str(&std::fs::read_to_string(path)?)?,
        None => BatterySet::builtin(),
    };

    if cli.list_batteries {
        for battery in batteries.iter() {
            println!(
                "{:<24} [{}] {} ({} questions)",
                battery.id,
                battery.category,
                battery.name,
                battery.items.len()
            );
        }
        return Ok(());
    }

    if let Some(id) = &cli.battery {
        return run_assessment(batteries, id);
    }

    let text = read_text(&cli)?;
    let analysis = analyze(&text);
    print_analysis(&analysis);

    if cli.pace {
        run_paced(&text, settings)?;
    }

    Ok(())
}

fn read_text(cli: &Cli) -> Result<String, Box<dyn Error>> {
    match &cli.file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_analysis(analysis: &TextAnalysis) {
    let stats = &analysis.stats;
    println!(
        "{} words, {} characters, {} sentences, {} avg words/sentence",
        stats.word_count, stats.character_count, stats.sentence_count, stats.avg_words_per_sentence
    );
    println!(
        "Flesch score {}: {} ({})",
        analysis.readability.flesch_score,
        analysis.readability.level,
        analysis.readability.grade_level
    );
}

fn run_paced(text: &str, settings: ReaderSettings) -> Result<(), Box<dyn Error>> {
    let words = tokenize(text);
    if words.is_empty() {
        return Err("nothing to read: the text contains no words".into());
    }

    let mut pacer = Pacer::new();
    let mut stats = ReadingStats::new();
    let runner = Runner::new(IdleCommandSource);

    println!("\npacing {} words at {} wpm", words.len(), settings.wpm);
    pacer.start(words, settings, Instant::now())?;

    let mut out = io::stdout();
    if let Some(word) = pacer.current_word() {
        print!("\r{word:<40}");
        out.flush()?;
    }

    loop {
        match runner.step(&mut pacer, &mut stats) {
            StepOutcome::Advanced(_) => {
                if let Some(word) = pacer.current_word() {
                    print!("\r{word:<40}");
                    out.flush()?;
                }
            }
            StepOutcome::Completed | StepOutcome::Disconnected => break,
            StepOutcome::Applied | StepOutcome::Rejected(_) | StepOutcome::Idle => {}
        }
    }

    println!(
        "\n{}  read {} words at {} wpm (sessions completed: {})",
        chrono::Local::now().format("%c"),
        stats.words_read,
        stats.current_wpm,
        stats.sessions_completed,
    );
    Ok(())
}

fn run_assessment(batteries: BatterySet, battery_id: &str) -> Result<(), Box<dyn Error>> {
    let mut engine = AssessmentEngine::new(batteries);
    let mut stats = ReadingStats::new();

    let total = engine.start_test(battery_id)?.items.len();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    for question_index in 0..total {
        let item = match engine.session().and_then(|s| s.current_item()) {
            Some(item) => item.clone(),
            None => break,
        };

        println!("\nQuestion {}/{}", question_index + 1, total);
        println!("{}\n", item.passage);
        println!("{}", item.question);
        for (i, option) in item.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        print!("answer (1-{}, empty to skip): ", item.options.len());
        io::stdout().flush()?;

        if let Some(line) = lines.next() {
            if let Ok(choice) = line?.trim().parse::<usize>() {
                if choice >= 1 {
                    engine.answer(question_index, choice - 1)?;
                }
            }
        }

        if question_index + 1 < total {
            engine.next_question()?;
        }
    }

    let results = engine.finish(&mut stats)?;

    println!("\n--- results ---");
    println!(
        "overall {:.0}% ({}/{} correct, {:.0}s)",
        results.overall_score,
        results.questions_correct,
        results.total_questions,
        results.time_spent.as_secs_f64(),
    );
    for category in &results.category_scores {
        println!("  {:<14} {:.0}%", category.category, category.score);
    }
    println!("recommendations:");
    for recommendation in &results.recommendations {
        println!("  - {recommendation}");
    }
    Ok(())
}
