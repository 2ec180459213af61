use crate::assessment::TestResults;
use serde::Serialize;
use std::time::Duration;

/// Cumulative reading statistics for one application run.
///
/// This is plain owned state: the caller creates it and passes it `&mut`
/// into the pacer and the assessment engine, which update it through the
/// methods below. Nothing here is global and nothing persists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStats {
    /// Words shown so far in the current pacing session.
    pub words_read: usize,
    pub current_wpm: u32,
    /// Running mean of the WPM of completed pacing sessions.
    pub average_wpm: f64,
    pub sessions_completed: u32,
    /// Total paced reading time across completed sessions.
    pub time_elapsed: Duration,
    /// Running mean of assessment overall scores.
    pub accuracy: f64,
    /// Overall score of the most recent assessment.
    pub comprehension_score: f64,
    pub assessments_completed: u32,
}

impl Default for ReadingStats {
    fn default() -> Self {
        Self {
            words_read: 0,
            current_wpm: 0,
            average_wpm: 0.0,
            sessions_completed: 0,
            time_elapsed: Duration::ZERO,
            accuracy: 0.0,
            comprehension_score: 0.0,
            assessments_completed: 0,
        }
    }
}

impl ReadingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the pacer on every advance.
    pub fn record_tick(&mut self, wpm: u32, words_read: usize) {
        self.current_wpm = wpm;
        self.words_read = words_read;
    }

    /// Called by the pacer when a session runs to natural completion.
    pub fn complete_session(&mut self, wpm: u32, elapsed: Duration) {
        self.sessions_completed += 1;
        self.time_elapsed += elapsed;
        let n = f64::from(self.sessions_completed);
        self.average_wpm += (f64::from(wpm) - self.average_wpm) / n;
    }

    /// Called by the assessment engine when a test session finishes.
    pub fn record_assessment(&mut self, results: &TestResults) {
        self.assessments_completed += 1;
        self.comprehension_score = results.overall_score;
        let n = f64::from(self.assessments_completed);
        self.accuracy += (results.overall_score - self.accuracy) / n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tick_overwrites() {
        let mut stats = ReadingStats::new();
        stats.record_tick(250, 1);
        stats.record_tick(300, 7);
        assert_eq!(stats.current_wpm, 300);
        assert_eq!(stats.words_read, 7);
    }

    #[test]
    fn test_complete_session_running_average() {
        let mut stats = ReadingStats::new();
        stats.complete_session(200, Duration::from_secs(30));
        stats.complete_session(400, Duration::from_secs(30));
        assert_eq!(stats.sessions_completed, 2);
        assert_eq!(stats.average_wpm, 300.0);
        assert_eq!(stats.time_elapsed, Duration::from_secs(60));
    }

    #[test]
    fn test_record_assessment_tracks_latest_and_mean() {
        let mut stats = ReadingStats::new();
        let results = TestResults {
            battery_id: "b".into(),
            overall_score: 100.0,
            questions_correct: 2,
            total_questions: 2,
            time_spent: Duration::from_secs(5),
            category_scores: vec![],
            recommendations: vec![],
        };
        stats.record_assessment(&results);

        let results = TestResults {
            overall_score: 50.0,
            questions_correct: 1,
            ..results
        };
        stats.record_assessment(&results);

        assert_eq!(stats.comprehension_score, 50.0);
        assert_eq!(stats.accuracy, 75.0);
        assert_eq!(stats.assessments_completed, 2);
    }
}
