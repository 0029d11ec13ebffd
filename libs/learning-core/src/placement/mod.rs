//! Adaptive CEFR placement test.
//!
//! A session is a plain [`TestState`] value. [`PlacementEngine`] reads it to
//! pick the next question and returns a new state for every answer, so a
//! session can be serialized, resumed or simply dropped to cancel it.

pub mod result;

use crate::bank::{QuestionBank, TestQuestion};
use crate::config::PlacementConfig;
use crate::error::{EngineError, Result};
use crate::types::{CefrLevel, Skill, SkillTally};
use self::result::LevelTestResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Why a session stopped asking questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Level held steady over the stability window.
    Stable,
    /// Hit the question cap.
    HardCap,
    /// The bank ran out before either of the above.
    BankExhausted,
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub skill: Skill,
    /// Level the question was tagged with.
    pub level: CefrLevel,
    pub answer_index: usize,
    pub correct: bool,
    pub time_spent: f64,
    /// Session level after this answer was applied.
    pub level_after: CefrLevel,
    pub level_changed: bool,
}

/// Session state of a placement test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestState {
    pub initial_level: CefrLevel,
    pub current_level: CefrLevel,
    pub answered_questions: Vec<AnsweredQuestion>,
    pub skill_tallies: BTreeMap<Skill, SkillTally>,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<TerminationReason>,
}

impl TestState {
    fn new(initial_level: CefrLevel) -> Self {
        Self {
            initial_level,
            current_level: initial_level,
            answered_questions: Vec::new(),
            skill_tallies: BTreeMap::new(),
            consecutive_correct: 0,
            consecutive_wrong: 0,
            completed: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    pub fn answered_count(&self) -> usize {
        self.answered_questions.len()
    }

    pub fn correct_count(&self) -> usize {
        self.answered_questions.iter().filter(|a| a.correct).count()
    }

    /// Running accuracy over every answer so far, 0.0 before the first.
    pub fn current_accuracy(&self) -> f64 {
        if self.answered_questions.is_empty() {
            return 0.0;
        }
        self.correct_count() as f64 / self.answered_questions.len() as f64
    }

    pub fn tally(&self, skill: Skill) -> SkillTally {
        self.skill_tallies.get(&skill).copied().unwrap_or_default()
    }

    /// Trailing answers that did not move the level.
    pub fn stable_run(&self) -> usize {
        self.answered_questions
            .iter()
            .rev()
            .take_while(|a| !a.level_changed)
            .count()
    }

    /// Total seconds spent answering.
    pub fn time_spent(&self) -> f64 {
        self.answered_questions.iter().map(|a| a.time_spent).sum()
    }

    fn has_answered(&self, question_id: &str) -> bool {
        self.answered_questions
            .iter()
            .any(|a| a.question_id == question_id)
    }
}

/// Outcome of a single answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub state: TestState,
    pub correct: bool,
    pub should_continue: bool,
}

/// Progress through the question cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestProgress {
    pub current: usize,
    pub max: usize,
    pub percentage: f64,
}

/// Runs placement sessions against a question bank.
#[derive(Debug, Clone)]
pub struct PlacementEngine<'b> {
    bank: &'b QuestionBank,
    config: PlacementConfig,
}

impl<'b> PlacementEngine<'b> {
    pub fn new(bank: &'b QuestionBank, config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { bank, config })
    }

    pub fn with_defaults(bank: &'b QuestionBank) -> Self {
        Self {
            bank,
            config: PlacementConfig::default(),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Start a session at `initial_level`, clamped into the placement window.
    pub fn create_session(&self, initial_level: CefrLevel) -> TestState {
        let level = initial_level.clamp_to(self.config.min_level, self.config.max_level);
        tracing::debug!(%level, bank_size = self.bank.len(), "placement session started");
        TestState::new(level)
    }

    /// Session at the configured initial level.
    pub fn create_default_session(&self) -> TestState {
        self.create_session(self.config.initial_level)
    }

    /// Pick the next unasked question.
    ///
    /// Prefers the current level, then the nearest level with questions
    /// left (ties go to the level closest to the last question asked).
    /// Within a level the least-tested skill wins, then bank order.
    pub fn next_question(&self, state: &TestState) -> Result<&'b TestQuestion> {
        if state.is_complete() {
            return Err(EngineError::TestAlreadyComplete);
        }

        let current = state.current_level;
        let previous = state
            .answered_questions
            .last()
            .map_or(current, |a| a.level);
        let answered: HashSet<&str> = state
            .answered_questions
            .iter()
            .map(|a| a.question_id.as_str())
            .collect();

        let mut levels: Vec<CefrLevel> = CefrLevel::ALL
            .into_iter()
            .filter(|l| (self.config.min_level..=self.config.max_level).contains(l))
            .collect();
        levels.sort_by_key(|l| (l.distance(current), l.distance(previous), *l));

        let bank: &'b QuestionBank = self.bank;
        for level in levels {
            let pick = bank
                .available(level, &answered)
                .min_by_key(|q| (state.tally(q.skill).total, q.skill));

            if let Some(question) = pick {
                if level != current {
                    tracing::warn!(
                        %current,
                        fallback = %level,
                        "no questions left at current level, falling back"
                    );
                }
                return Ok(question);
            }
        }

        Err(EngineError::EmptyBank { level: current })
    }

    /// Apply one answer and decide whether the test continues.
    pub fn submit_answer(
        &self,
        state: &TestState,
        question: &TestQuestion,
        answer_index: usize,
        time_spent_seconds: f64,
    ) -> Result<Submission> {
        if state.is_complete() {
            return Err(EngineError::TestAlreadyComplete);
        }
        if !self.bank.contains(&question.id) {
            return Err(EngineError::UnknownQuestion {
                id: question.id.clone(),
            });
        }
        if state.has_answered(&question.id) {
            return Err(EngineError::QuestionAlreadyAnswered {
                id: question.id.clone(),
            });
        }
        if answer_index >= question.options.len() {
            return Err(EngineError::AnswerOutOfRange {
                id: question.id.clone(),
                index: answer_index,
                options: question.options.len(),
            });
        }

        let mut next = state.clone();
        let correct = question.is_correct(answer_index);

        next.skill_tallies
            .entry(question.skill)
            .or_default()
            .record(correct);

        if correct {
            next.consecutive_correct += 1;
            next.consecutive_wrong = 0;
        } else {
            next.consecutive_wrong += 1;
            next.consecutive_correct = 0;
        }

        let before = next.current_level;
        if next.consecutive_correct >= self.config.promote_streak {
            next.current_level = before.promoted(self.config.max_level);
            next.consecutive_correct = 0;
        } else if next.consecutive_wrong >= self.config.demote_streak {
            next.current_level = before.demoted(self.config.min_level);
            next.consecutive_wrong = 0;
        }
        let level_changed = next.current_level != before;
        if level_changed {
            tracing::info!(from = %before, to = %next.current_level, "placement level adjusted");
        }

        let time_spent = if time_spent_seconds.is_finite() {
            time_spent_seconds.max(0.0)
        } else {
            0.0
        };
        next.answered_questions.push(AnsweredQuestion {
            question_id: question.id.clone(),
            skill: question.skill,
            level: question.level,
            answer_index,
            correct,
            time_spent,
            level_after: next.current_level,
            level_changed,
        });

        next.completed = self.termination(&next);
        let should_continue = next.completed.is_none();

        tracing::debug!(
            question_id = %question.id,
            correct,
            answered = next.answered_count(),
            level = %next.current_level,
            should_continue,
            "placement answer recorded"
        );
        if let Some(reason) = next.completed {
            tracing::info!(?reason, level = %next.current_level, "placement test complete");
        }

        Ok(Submission {
            state: next,
            correct,
            should_continue,
        })
    }

    fn termination(&self, state: &TestState) -> Option<TerminationReason> {
        let answered = state.answered_count();
        if answered >= self.config.max_questions {
            return Some(TerminationReason::HardCap);
        }
        if answered >= self.config.min_questions
            && state.stable_run() >= self.config.stability_window
        {
            return Some(TerminationReason::Stable);
        }
        None
    }

    /// End a session whose bank has run dry. Fails unless `next_question`
    /// would report `EmptyBank`.
    pub fn conclude_exhausted(&self, state: &TestState) -> Result<TestState> {
        match self.next_question(state) {
            Err(EngineError::EmptyBank { level }) => {
                tracing::info!(
                    %level,
                    answered = state.answered_count(),
                    "placement bank exhausted"
                );
                let mut next = state.clone();
                next.completed = Some(TerminationReason::BankExhausted);
                Ok(next)
            }
            Err(other) => Err(other),
            Ok(_) => Err(EngineError::TestNotComplete {
                answered: state.answered_count(),
            }),
        }
    }

    /// Final result; only available once the session has terminated.
    pub fn result(&self, state: &TestState) -> Result<LevelTestResult> {
        match state.completed {
            Some(reason) => Ok(result::build(state, reason, &self.config)),
            None => Err(EngineError::TestNotComplete {
                answered: state.answered_count(),
            }),
        }
    }

    pub fn progress(&self, state: &TestState) -> TestProgress {
        let current = state.answered_count();
        let max = self.config.max_questions;
        TestProgress {
            current,
            max,
            percentage: current as f64 / max as f64 * 100.0,
        }
    }
}
