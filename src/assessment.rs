use crate::battery::{BatterySet, TestItem};
use crate::error::CoreError;
use crate::session::ReadingStats;
use serde::Serialize;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// Scored outcome of a finished test session. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResults {
    pub battery_id: String,
    pub overall_score: f64,
    pub questions_correct: usize,
    pub total_questions: usize,
    pub time_spent: Duration,
    pub category_scores: Vec<CategoryScore>,
    pub recommendations: Vec<String>,
}

/// A live multiple-choice session over one battery. `answers` always has
/// one slot per item; `None` marks an unanswered question, distinct from
/// an answered option 0.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub battery_id: String,
    pub items: Vec<TestItem>,
    pub current_index: usize,
    pub answers: Vec<Option<usize>>,
    pub started_at: SystemTime,
}

impl TestSession {
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.items.len()
    }

    pub fn current_item(&self) -> Option<&TestItem> {
        self.items.get(self.current_index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }
}

/// Turns an overall score into category scores and recommendations.
///
/// The default policy reproduces the fixed formulas this trainer has
/// always shipped; swapping in a genuinely adaptive policy requires no
/// change to the session state machine.
pub trait ScoringPolicy {
    fn category_scores(&self, overall_score: f64) -> Vec<CategoryScore>;
    fn recommendations(&self, overall_score: f64) -> Vec<String>;
}

/// Fixed-offset scoring: Comprehension equals the overall score,
/// Analysis trails it by 10 points and Inference by 5, both floored at
/// zero. Recommendations are the same three lines regardless of score.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedScoringPolicy;

impl ScoringPolicy for FixedScoringPolicy {
    fn category_scores(&self, overall_score: f64) -> Vec<CategoryScore> {
        vec![
            CategoryScore {
                category: "Comprehension".into(),
                score: overall_score,
            },
            CategoryScore {
                category: "Analysis".into(),
                score: (overall_score - 10.0).max(0.0),
            },
            CategoryScore {
                category: "Inference".into(),
                score: (overall_score - 5.0).max(0.0),
            },
        ]
    }

    fn recommendations(&self, _overall_score: f64) -> Vec<String> {
        vec![
            "Continue practicing with speed reading exercises".into(),
            "Focus on improving comprehension accuracy".into(),
            "Try more challenging texts to build skills".into(),
        ]
    }
}

/// Assessment session engine: at most one live session at a time, driven
/// by answer/navigation calls, finished into a `TestResults`.
pub struct AssessmentEngine {
    batteries: BatterySet,
    policy: Box<dyn ScoringPolicy>,
    session: Option<TestSession>,
}

impl AssessmentEngine {
    pub fn new(batteries: BatterySet) -> Self {
        Self::with_policy(batteries, Box::new(FixedScoringPolicy))
    }

    pub fn with_policy(batteries: BatterySet, policy: Box<dyn ScoringPolicy>) -> Self {
        Self {
            batteries,
            policy,
            session: None,
        }
    }

    pub fn batteries(&self) -> &BatterySet {
        &self.batteries
    }

    pub fn session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    /// Begin a session over the named battery. A session already in
    /// progress is discarded; only one is ever live.
    pub fn start_test(&mut self, battery_id: &str) -> Result<&TestSession, CoreError> {
        let battery = self
            .batteries
            .get(battery_id)
            .ok_or_else(|| CoreError::BatteryNotFound(battery_id.to_string()))?;

        let session = TestSession {
            battery_id: battery.id.clone(),
            items: battery.items.clone(),
            current_index: 0,
            answers: vec![None; battery.items.len()],
            started_at: SystemTime::now(),
        };

        Ok(&*self.session.insert(session))
    }

    /// Record an answer for the given question. Overwrites any earlier
    /// answer and leaves the current question unchanged. The option index
    /// is stored as supplied, without range checking against the item's
    /// options.
    pub fn answer(&mut self, question_index: usize, option_index: usize) -> Result<(), CoreError> {
        let session = self.session_mut()?;
        let slot = session
            .answers
            .get_mut(question_index)
            .ok_or(CoreError::InvalidState("question index out of range"))?;
        *slot = Some(option_index);
        Ok(())
    }

    /// Move to the next question, clamped at the last item.
    pub fn next_question(&mut self) -> Result<usize, CoreError> {
        let session = self.session_mut()?;
        let last = session.items.len().saturating_sub(1);
        session.current_index = (session.current_index + 1).min(last);
        Ok(session.current_index)
    }

    /// Move to the previous question, clamped at zero.
    pub fn previous_question(&mut self) -> Result<usize, CoreError> {
        let session = self.session_mut()?;
        session.current_index = session.current_index.saturating_sub(1);
        Ok(session.current_index)
    }

    /// Score the live session, fold the result into `stats`, and discard
    /// the session. Unanswered questions count as incorrect.
    pub fn finish(&mut self, stats: &mut ReadingStats) -> Result<TestResults, CoreError> {
        let session = self
            .session
            .take()
            .ok_or(CoreError::InvalidState("no test session in progress"))?;

        let time_spent = session.started_at.elapsed().unwrap_or_default();
        let questions_correct = session
            .answers
            .iter()
            .zip(&session.items)
            .filter(|(answer, item)| **answer == Some(item.correct_answer))
            .count();

        let total_questions = session.items.len();
        let overall_score = if total_questions > 0 {
            100.0 * questions_correct as f64 / total_questions as f64
        } else {
            0.0
        };

        let results = TestResults {
            battery_id: session.battery_id,
            overall_score,
            questions_correct,
            total_questions,
            time_spent,
            category_scores: self.policy.category_scores(overall_score),
            recommendations: self.policy.recommendations(overall_score),
        };

        stats.record_assessment(&results);
        Ok(results)
    }

    /// Discard the live session without scoring it.
    pub fn abandon(&mut self) {
        self.session = None;
    }

    fn session_mut(&mut self) -> Result<&mut TestSession, CoreError> {
        self.session
            .as_mut()
            .ok_or(CoreError::InvalidState("no test session in progress"))
    }
}
