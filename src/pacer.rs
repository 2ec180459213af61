use crate::error::CoreError;
use crate::session::ReadingStats;
use crate::settings::ReaderSettings;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Multiplier applied to a word's display interval when it ends a
/// sentence and `pause_at_punctuation` is enabled (3/2 of the base).
const PUNCTUATION_PAUSE_NUM: u32 = 3;
const PUNCTUATION_PAUSE_DEN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Playing,
    Paused,
    /// Terminal for the current run: reached via explicit stop or natural
    /// completion. A new run can still be started.
    Stopped,
}

/// Snapshot of pacing state for the shell to render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacingState {
    pub word_index: usize,
    pub progress_percent: f64,
    pub is_playing: bool,
    pub is_active: bool,
}

/// Outcome of a poll that was due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Advanced,
    /// The run reached the last word and stopped itself.
    Completed,
}

/// Word-by-word pacing scheduler.
///
/// Deadline based: the pacer records when the next advance is due and is
/// driven by `poll` with an explicit `now`. Control calls mutate state
/// synchronously, so once pause/stop/reset returns there is no pending
/// tick left to fire. Single-writer: not safe for concurrent control
/// calls without external synchronization.
#[derive(Debug)]
pub struct Pacer {
    words: Vec<String>,
    settings: ReaderSettings,
    phase: Phase,
    word_index: usize,
    progress_percent: f64,
    started_at: Option<Instant>,
    last_advance: Option<Instant>,
    next_due: Option<Instant>,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            settings: ReaderSettings::default(),
            phase: Phase::Idle,
            word_index: 0,
            progress_percent: 0.0,
            started_at: None,
            last_advance: None,
            next_due: None,
        }
    }

    /// Begin a run over `words`. Fails if a run is already active or if
    /// the word sequence is empty.
    pub fn start(
        &mut self,
        words: Vec<String>,
        settings: ReaderSettings,
        now: Instant,
    ) -> Result<(), CoreError> {
        if self.is_active() {
            return Err(CoreError::InvalidState("pacer already active"));
        }
        if words.is_empty() {
            return Err(CoreError::InvalidState("cannot start with empty text"));
        }

        self.words = words;
        self.settings = settings.clamped();
        self.phase = Phase::Playing;
        self.word_index = 0;
        self.progress_percent = 0.0;
        self.started_at = Some(now);
        self.last_advance = Some(now);
        self.next_due = Some(now + self.interval_after(0));
        Ok(())
    }

    /// Playing <-> Paused; no-op when Idle or Stopped.
    pub fn toggle_play_pause(&mut self, now: Instant) {
        match self.phase {
            Phase::Playing => {
                self.phase = Phase::Paused;
                self.next_due = None;
            }
            Phase::Paused => {
                self.phase = Phase::Playing;
                self.last_advance = Some(now);
                self.next_due = Some(now + self.interval_after(self.word_index));
            }
            Phase::Idle | Phase::Stopped => {}
        }
    }

    /// Rewind to the first word with playback paused. Does not resume.
    pub fn reset(&mut self) {
        self.word_index = 0;
        self.progress_percent = 0.0;
        self.next_due = None;
        if self.is_active() {
            self.phase = Phase::Paused;
        } else {
            self.phase = Phase::Idle;
        }
    }

    /// End the run and clear position.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.word_index = 0;
        self.progress_percent = 0.0;
        self.last_advance = None;
        self.next_due = None;
    }

    /// Apply new settings. A WPM change while playing reschedules the
    /// pending tick from the last advance without losing position.
    pub fn update_settings(&mut self, settings: ReaderSettings, _now: Instant) {
        self.settings = settings.clamped();
        if self.phase == Phase::Playing {
            self.next_due = self
                .last_advance
                .map(|at| at + self.interval_after(self.word_index));
        }
    }

    /// Advance if the pending tick is due. Returns `None` while nothing
    /// is due (or playback is not running). At most one advance per call.
    pub fn poll(&mut self, now: Instant, stats: &mut ReadingStats) -> Option<Tick> {
        if self.phase != Phase::Playing {
            return None;
        }
        let due = self.next_due?;
        if now < due {
            return None;
        }

        let next = self.word_index + 1;
        if next >= self.words.len() {
            // Never past the last word: the run stops itself.
            self.phase = Phase::Stopped;
            self.progress_percent = 100.0;
            self.next_due = None;
            let elapsed = self
                .started_at
                .map(|at| now.saturating_duration_since(at))
                .unwrap_or_default();
            stats.complete_session(self.settings.wpm, elapsed);
            return Some(Tick::Completed);
        }

        self.word_index = next;
        self.progress_percent = 100.0 * (next + 1) as f64 / self.words.len() as f64;
        stats.record_tick(self.settings.wpm, next + 1);
        self.last_advance = Some(now);
        self.next_due = Some(now + self.interval_after(next));
        Some(Tick::Advanced)
    }

    /// Time remaining until the pending tick, if playback is running.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            Phase::Playing => self.next_due.map(|due| due.saturating_duration_since(now)),
            _ => None,
        }
    }

    pub fn state(&self) -> PacingState {
        PacingState {
            word_index: self.word_index,
            progress_percent: self.progress_percent,
            is_playing: self.phase == Phase::Playing,
            is_active: self.is_active(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Paused)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.word_index).map(String::as_str)
    }

    pub fn settings(&self) -> ReaderSettings {
        self.settings
    }

    fn interval_after(&self, index: usize) -> Duration {
        let base_ms = u64::from(60_000 / self.settings.wpm);
        let ends_sentence = self
            .words
            .get(index)
            .map(|w| w.ends_with(['.', '!', '?']))
            .unwrap_or(false);

        if self.settings.pause_at_punctuation && ends_sentence {
            Duration::from_millis(
                base_ms * u64::from(PUNCTUATION_PAUSE_NUM) / u64::from(PUNCTUATION_PAUSE_DEN),
            )
        } else {
            Duration::from_millis(base_ms)
        }
    }
}
