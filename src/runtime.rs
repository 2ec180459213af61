use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::error::CoreError;
use crate::pacer::{Pacer, PacingState, Tick};
use crate::session::ReadingStats;
use crate::settings::ReaderSettings;

/// Control commands accepted by the pacer driver.
#[derive(Clone, Debug)]
pub enum PacerCommand {
    Start {
        words: Vec<String>,
        settings: ReaderSettings,
    },
    TogglePlayPause,
    Reset,
    Stop,
    UpdateSettings(ReaderSettings),
}

/// Source of control commands (keyboard handler, UI thread, tests).
pub trait CommandSource {
    /// Block for up to `timeout` waiting for a command. Returns
    /// Err(Timeout) when the timeout expires with nothing to do.
    fn recv_timeout(&self, timeout: Duration) -> Result<PacerCommand, RecvTimeoutError>;
}

/// Production command source fed from a channel, e.g. by an input thread.
pub struct ChannelCommandSource {
    rx: Receiver<PacerCommand>,
}

impl ChannelCommandSource {
    pub fn new() -> (Sender<PacerCommand>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl CommandSource for ChannelCommandSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PacerCommand, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Command source that never produces a command; it sleeps the timeout
/// away. Used when a run should play out uninterrupted.
pub struct IdleCommandSource;

impl CommandSource for IdleCommandSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PacerCommand, RecvTimeoutError> {
        std::thread::sleep(timeout);
        Err(RecvTimeoutError::Timeout)
    }
}

/// Test command source wrapping a plain receiver.
pub struct TestCommandSource {
    rx: Receiver<PacerCommand>,
}

impl TestCommandSource {
    pub fn new(rx: Receiver<PacerCommand>) -> Self {
        Self { rx }
    }
}

impl CommandSource for TestCommandSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PacerCommand, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// What a single driver step did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A tick was due and the pacer advanced.
    Advanced(PacingState),
    /// The run completed and the pacer stopped itself.
    Completed,
    /// A command arrived and was applied.
    Applied,
    /// A command arrived but was invalid for the current state.
    Rejected(CoreError),
    /// The wait expired with nothing due.
    Idle,
    /// The command channel is gone; the driver should shut down.
    Disconnected,
}

/// Apply one control command to a pacer.
pub fn apply_command(
    pacer: &mut Pacer,
    command: PacerCommand,
    now: Instant,
) -> Result<(), CoreError> {
    match command {
        PacerCommand::Start { words, settings } => pacer.start(words, settings, now),
        PacerCommand::TogglePlayPause => {
            pacer.toggle_play_pause(now);
            Ok(())
        }
        PacerCommand::Reset => {
            pacer.reset();
            Ok(())
        }
        PacerCommand::Stop => {
            pacer.stop();
            Ok(())
        }
        PacerCommand::UpdateSettings(settings) => {
            pacer.update_settings(settings, now);
            Ok(())
        }
    }
}

/// Drives a pacer one command or tick at a time.
///
/// Each step waits at most until the pacer's pending deadline (a fallback
/// interval when idle). Commands preempt the wait and are applied before
/// any tick, so a pause or stop arriving ahead of the deadline cancels
/// that tick. The runner holds `&mut Pacer` for the whole step;
/// serialization of control is the caller's job.
pub struct Runner<C: CommandSource> {
    source: C,
    fallback: Duration,
}

impl<C: CommandSource> Runner<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            fallback: Duration::from_millis(50),
        }
    }

    pub fn with_fallback(source: C, fallback: Duration) -> Self {
        Self { source, fallback }
    }

    pub fn step(&self, pacer: &mut Pacer, stats: &mut ReadingStats) -> StepOutcome {
        let timeout = pacer
            .time_until_due(Instant::now())
            .unwrap_or(self.fallback);

        match self.source.recv_timeout(timeout) {
            Ok(command) => match apply_command(pacer, command, Instant::now()) {
                Ok(()) => StepOutcome::Applied,
                Err(e) => StepOutcome::Rejected(e),
            },
            Err(RecvTimeoutError::Timeout) => match pacer.poll(Instant::now(), stats) {
                Some(Tick::Advanced) => StepOutcome::Advanced(pacer.state()),
                Some(Tick::Completed) => StepOutcome::Completed,
                None => StepOutcome::Idle,
            },
            Err(RecvTimeoutError::Disconnected) => StepOutcome::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fast_settings() -> ReaderSettings {
        ReaderSettings {
            wpm: 1000, // 60ms per word
            pause_at_punctuation: false,
            ..Default::default()
        }
    }

    fn start_command(text: &str) -> PacerCommand {
        PacerCommand::Start {
            words: crate::analysis::tokenize(text),
            settings: fast_settings(),
        }
    }

    #[test]
    fn step_is_idle_on_timeout_without_a_run() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::with_fallback(TestCommandSource::new(rx), Duration::from_millis(1));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();
        assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Idle);
    }

    #[test]
    fn step_applies_pending_command_first() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(TestCommandSource::new(rx));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();

        tx.send(start_command("a b c")).unwrap();
        assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Applied);
        assert!(pacer.state().is_playing);
    }

    #[test]
    fn command_ahead_of_deadline_cancels_the_tick() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(TestCommandSource::new(rx));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();

        tx.send(start_command("a b c")).unwrap();
        runner.step(&mut pacer, &mut stats);

        // Stop arrives before the 60ms deadline: it must be applied and
        // no tick may fire afterwards.
        tx.send(PacerCommand::Stop).unwrap();
        assert_eq!(runner.step(&mut pacer, &mut stats), StepOutcome::Applied);
        assert!(!pacer.state().is_active);
        assert_eq!(pacer.state().word_index, 0);

        let (_tx2, rx2) = mpsc::channel();
        let idle_runner =
            Runner::with_fallback(TestCommandSource::new(rx2), Duration::from_millis(80));
        assert_eq!(idle_runner.step(&mut pacer, &mut stats), StepOutcome::Idle);
        assert_eq!(stats.words_read, 0);
    }

    #[test]
    fn run_plays_out_to_completion() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(TestCommandSource::new(rx));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();

        tx.send(start_command("a b c d")).unwrap();
        runner.step(&mut pacer, &mut stats);

        let mut advances = 0;
        loop {
            match runner.step(&mut pacer, &mut stats) {
                StepOutcome::Advanced(_) => advances += 1,
                StepOutcome::Completed => break,
                StepOutcome::Idle => {}
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        // N words advance N-1 times before the run stops itself.
        assert_eq!(advances, 3);
        assert_eq!(pacer.state().progress_percent, 100.0);
        assert_eq!(stats.sessions_completed, 1);
    }

    #[test]
    fn invalid_command_is_rejected_not_fatal() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(TestCommandSource::new(rx));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();

        tx.send(PacerCommand::Start {
            words: vec![],
            settings: fast_settings(),
        })
        .unwrap();
        assert_matches!(
            runner.step(&mut pacer, &mut stats),
            StepOutcome::Rejected(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn disconnected_channel_ends_the_driver() {
        let (tx, rx) = mpsc::channel::<PacerCommand>();
        drop(tx);
        let runner = Runner::new(TestCommandSource::new(rx));
        let mut pacer = Pacer::new();
        let mut stats = ReadingStats::new();
        assert_eq!(
            runner.step(&mut pacer, &mut stats),
            StepOutcome::Disconnected
        );
    }
}
