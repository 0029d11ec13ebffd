//! Core types shared by the placement test and the review scheduler.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// CEFR proficiency level, ordered from beginner to mastery.
///
/// Content may be tagged C1/C2; the placement test itself steers within
/// the configured `[min_level, max_level]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        Self::A1,
        Self::A2,
        Self::B1,
        Self::B2,
        Self::C1,
        Self::C2,
    ];

    /// Position on the scale, A1 = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    /// One step up, never past `max`.
    pub fn promoted(self, max: CefrLevel) -> Self {
        if self >= max {
            return max;
        }
        Self::from_index(self.index() + 1).unwrap_or(max)
    }

    /// One step down, never past `min`.
    pub fn demoted(self, min: CefrLevel) -> Self {
        if self <= min {
            return min;
        }
        Self::from_index(self.index() - 1).unwrap_or(min)
    }

    /// Number of steps between two levels.
    pub fn distance(self, other: CefrLevel) -> usize {
        self.index().abs_diff(other.index())
    }

    pub fn clamp_to(self, min: CefrLevel, max: CefrLevel) -> Self {
        self.max(min).min(max)
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::InvalidConfig(format!("unknown CEFR level {s:?}")))
    }
}

/// Skill a placement question exercises. Declaration order is the
/// tie-break order everywhere skills are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Vocabulary,
    Grammar,
    Listening,
    Reading,
}

impl Skill {
    pub const ALL: [Skill; 4] = [
        Self::Vocabulary,
        Self::Grammar,
        Self::Listening,
        Self::Reading,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Grammar => "grammar",
            Self::Listening => "listening",
            Self::Reading => "reading",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correct/total counter for one skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTally {
    pub correct: u32,
    pub total: u32,
}

impl SkillTally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Fraction correct, 0.0 when never tested.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// Rating for a vocabulary review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewRating {
    pub const ALL: [ReviewRating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map a pass/fail answer onto the 4-point scale.
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Good
        } else {
            Self::Again
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for ReviewRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewRating {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::InvalidRating(trimmed.to_string()))
    }
}

impl TryFrom<u8> for ReviewRating {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| EngineError::InvalidRating(value.to_string()))
    }
}

/// Memory state of one learned word.
///
/// `next_review_date` is always `last_reviewed_date + interval` days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsRecord {
    pub word_id: String,
    /// Days until the next review, at least 1.
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub last_reviewed_date: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
}

impl SrsRecord {
    /// Whether the word is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }

    /// Checks the record invariants: interval of at least one day, a finite
    /// ease factor on or above `minimum_ease`, and a due date derived from
    /// the last review.
    pub fn is_well_formed(&self, minimum_ease: f64) -> bool {
        self.interval >= 1
            && self.ease_factor.is_finite()
            && self.ease_factor >= minimum_ease
            && self.next_review_date
                == self.last_reviewed_date + Duration::days(i64::from(self.interval))
    }
}
