//! Placement question bank.
//!
//! # Format
//! ```json
//! [
//!   {
//!     "id": "a2-vocab-01",
//!     "type": "vocabulary",
//!     "level": "A2",
//!     "question": "Choose the opposite of \"cheap\".",
//!     "options": ["expensive", "small", "quiet", "early"],
//!     "correctAnswer": 0,
//!     "explanation": "\"Expensive\" means costing a lot."
//!   }
//! ]
//! ```

use crate::error::{EngineError, Result};
use crate::types::{CefrLevel, Skill};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A multiple-choice placement question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub skill: Skill,
    pub level: CefrLevel,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl TestQuestion {
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_answer
    }

    /// Copy with options permuted by `rng` and `correct_answer` remapped.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> TestQuestion {
        let mut order: Vec<usize> = (0..self.options.len()).collect();
        order.shuffle(rng);

        let options = order.iter().map(|&i| self.options[i].clone()).collect();
        let correct_answer = order
            .iter()
            .position(|&i| i == self.correct_answer)
            .unwrap_or(self.correct_answer);

        TestQuestion {
            options,
            correct_answer,
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            return Err(EngineError::MissingOptions {
                id: self.id.clone(),
            });
        }
        if self.correct_answer >= self.options.len() {
            return Err(EngineError::CorrectAnswerOutOfRange {
                id: self.id.clone(),
                index: self.correct_answer,
                options: self.options.len(),
            });
        }
        Ok(())
    }
}

/// Immutable, validated collection of placement questions indexed by level.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<TestQuestion>,
    by_id: HashMap<String, usize>,
    by_level: BTreeMap<CefrLevel, Vec<usize>>,
}

impl QuestionBank {
    /// Build a bank, rejecting duplicate ids and malformed questions.
    pub fn new(questions: Vec<TestQuestion>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(questions.len());
        let mut by_level: BTreeMap<CefrLevel, Vec<usize>> = BTreeMap::new();

        for (idx, question) in questions.iter().enumerate() {
            question.validate()?;
            if by_id.insert(question.id.clone(), idx).is_some() {
                return Err(EngineError::DuplicateQuestionId {
                    id: question.id.clone(),
                });
            }
            by_level.entry(question.level).or_default().push(idx);
        }

        Ok(Self {
            questions,
            by_id,
            by_level,
        })
    }

    /// Parse a JSON array of questions.
    pub fn from_json(json: &str) -> Result<Self> {
        let questions: Vec<TestQuestion> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TestQuestion> {
        self.by_id.get(id).map(|&idx| &self.questions[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Questions tagged with `level`, in bank order.
    pub fn at_level(&self, level: CefrLevel) -> impl Iterator<Item = &TestQuestion> {
        self.by_level
            .get(&level)
            .into_iter()
            .flatten()
            .map(|&idx| &self.questions[idx])
    }

    /// Questions at `level` whose ids are not in `answered`, in bank order.
    pub fn available<'a, 's>(
        &'a self,
        level: CefrLevel,
        answered: &'s HashSet<&'s str>,
    ) -> impl Iterator<Item = &'a TestQuestion> + 's
    where
        'a: 's,
    {
        self.at_level(level)
            .filter(move |q| !answered.contains(q.id.as_str()))
    }

    pub fn count_at(&self, level: CefrLevel) -> usize {
        self.by_level.get(&level).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestQuestion> {
        self.questions.iter()
    }
}
