use crate::util::round1;
use itertools::Itertools;
use serde::Serialize;

/// Derived counters for a text snapshot. Recomputed on every text change,
/// never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStatistics {
    pub word_count: usize,
    pub character_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum ReadingLevel {
    #[strum(serialize = "Very Easy")]
    VeryEasy,
    Easy,
    #[strum(serialize = "Fairly Easy")]
    FairlyEasy,
    Standard,
    #[strum(serialize = "Fairly Difficult")]
    FairlyDifficult,
    Difficult,
    #[strum(serialize = "Very Difficult")]
    VeryDifficult,
}

impl ReadingLevel {
    /// Map a Flesch Reading Ease score to a level, inclusive lower
    /// bounds evaluated highest-first.
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 90 => ReadingLevel::VeryEasy,
            s if s >= 80 => ReadingLevel::Easy,
            s if s >= 70 => ReadingLevel::FairlyEasy,
            s if s >= 60 => ReadingLevel::Standard,
            s if s >= 50 => ReadingLevel::FairlyDifficult,
            s if s >= 30 => ReadingLevel::Difficult,
            _ => ReadingLevel::VeryDifficult,
        }
    }

    pub fn grade_level(&self) -> &'static str {
        match self {
            ReadingLevel::VeryEasy => "5th grade",
            ReadingLevel::Easy => "6th grade",
            ReadingLevel::FairlyEasy => "7th grade",
            ReadingLevel::Standard => "8th-9th grade",
            ReadingLevel::FairlyDifficult => "10th-12th grade",
            ReadingLevel::Difficult => "College level",
            ReadingLevel::VeryDifficult => "Graduate level",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadabilityResult {
    pub flesch_score: i64,
    pub level: ReadingLevel,
    pub grade_level: &'static str,
}

/// Combined output of a single analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub stats: TextStatistics,
    pub readability: ReadabilityResult,
}

/// Split raw text into the word sequence used by both the statistics and
/// the pacer: trim, split on whitespace runs, drop empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Count sentences: fragments between runs of `.`, `!`, `?` that are
/// non-empty after trimming.
pub fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimate syllables in a single word.
///
/// This is an approximation, not a linguistic analysis: lowercase the
/// word, treat anything of three letters or fewer as one syllable, strip
/// a trailing silent-e / "-ed" / "-es" (the silent-e and "-es" forms take
/// the preceding consonant with them), strip a leading "y", then count
/// maximal vowel runs at one syllable per two vowels.
pub fn count_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut chars: Vec<char> = lower.chars().collect();
    if chars.len() <= 3 {
        return 1;
    }

    // "l" counts as a vowel-class letter for the suffix check only.
    let suffix_consonant = |c: char| c != 'l' && !is_vowel(c);

    let n = chars.len();
    if suffix_consonant(chars[n - 3]) && chars[n - 2] == 'e' && chars[n - 1] == 's' {
        chars.truncate(n - 3);
    } else if chars[n - 2] == 'e' && chars[n - 1] == 'd' {
        chars.truncate(n - 2);
    } else if suffix_consonant(chars[n - 2]) && chars[n - 1] == 'e' {
        chars.truncate(n - 2);
    }

    if chars.first() == Some(&'y') {
        chars.remove(0);
    }

    let runs: usize = chars
        .iter()
        .chunk_by(|c| is_vowel(**c))
        .into_iter()
        .filter(|(vowel_run, _)| *vowel_run)
        .map(|(_, run)| (run.count() + 1) / 2)
        .sum();

    runs.max(1)
}

/// Flesch Reading Ease over an already-tokenized word sequence.
/// Returns 0 when there are no words or no sentences.
pub fn flesch_score(words: &[String], sentence_count: usize) -> i64 {
    if words.is_empty() || sentence_count == 0 {
        return 0;
    }

    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let avg_words_per_sentence = words.len() as f64 / sentence_count as f64;
    let avg_syllables_per_word = syllables as f64 / words.len() as f64;

    (206.835 - 1.015 * avg_words_per_sentence - 84.6 * avg_syllables_per_word).round() as i64
}

/// Analyze raw text: pure function of its input, cheap enough to run on
/// every text change.
pub fn analyze(text: &str) -> TextAnalysis {
    let words = tokenize(text);
    let sentence_count = count_sentences(text);

    let avg_words_per_sentence = if sentence_count > 0 {
        round1(words.len() as f64 / sentence_count as f64)
    } else {
        0.0
    };

    let stats = TextStatistics {
        word_count: words.len(),
        character_count: text.chars().count(),
        sentence_count,
        avg_words_per_sentence,
    };

    let score = flesch_score(&words, sentence_count);
    let level = ReadingLevel::from_score(score);
    let readability = ReadabilityResult {
        flesch_score: score,
        level,
        grade_level: level.grade_level(),
    };

    TextAnalysis { stats, readability }
}
