//! SM-2 spaced repetition algorithm.
//!
//! SuperMemo 2 reduced to four discrete ratings. Ease adjustments and
//! interval multipliers are configurable; the defaults grow a word reviewed
//! as "good" roughly geometrically from a 1 day start.

use super::SpacedRepetitionAlgorithm;
use crate::error::{EngineError, Result};
use crate::types::{ReviewRating, SrsRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub easy_reward: f64,
    pub hard_multiplier: f64,
    pub easy_bonus: f64,
    /// Upper bound on any interval, in days.
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            again_penalty: 0.2,
            hard_penalty: 0.15,
            easy_reward: 0.15,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            maximum_interval: 36500,
        }
    }
}

impl Sm2 {
    pub fn validate(&self) -> Result<()> {
        if !(self.minimum_ease >= 1.0 && self.initial_ease >= self.minimum_ease) {
            return Err(EngineError::InvalidConfig(format!(
                "ease factors must satisfy 1.0 <= minimum ({}) <= initial ({})",
                self.minimum_ease, self.initial_ease
            )));
        }
        if !(self.hard_multiplier >= 1.0 && self.easy_bonus >= 1.0) {
            return Err(EngineError::InvalidConfig(
                "interval multipliers must be at least 1.0".to_string(),
            ));
        }
        if self.again_penalty < 0.0 || self.hard_penalty < 0.0 || self.easy_reward < 0.0 {
            return Err(EngineError::InvalidConfig(
                "ease adjustments must be non-negative".to_string(),
            ));
        }
        if self.maximum_interval == 0 {
            return Err(EngineError::InvalidConfig(
                "maximum_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply growth to `days`, limited by `maximum_interval` but never below
    /// `floor`. A record already past the cap keeps its interval.
    fn grow(&self, days: f64, floor: f64) -> u32 {
        let max = f64::from(self.maximum_interval);
        days.min(max).max(floor).max(1.0) as u32
    }

    /// Good always adds at least one day so repeated passes keep growing.
    fn good_interval(&self, interval: f64, ease: f64) -> f64 {
        f64::from(self.grow((interval * ease).round(), interval + 1.0))
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn new_record(&self, word_id: &str, now: DateTime<Utc>) -> SrsRecord {
        SrsRecord {
            word_id: word_id.to_string(),
            interval: 1,
            repetitions: 0,
            ease_factor: self.initial_ease,
            last_reviewed_date: now,
            next_review_date: now + Duration::days(1),
        }
    }

    fn minimum_ease(&self) -> f64 {
        self.minimum_ease
    }

    fn review(&self, record: &SrsRecord, rating: ReviewRating, now: DateTime<Utc>) -> SrsRecord {
        let ease = record.ease_factor.max(self.minimum_ease);
        let interval = f64::from(record.interval.max(1));

        let (repetitions, new_ease, new_interval) = match rating {
            ReviewRating::Again => (0, ease - self.again_penalty, 1),
            ReviewRating::Hard => (
                record.repetitions.saturating_add(1),
                ease - self.hard_penalty,
                self.grow((interval * self.hard_multiplier).round(), interval),
            ),
            ReviewRating::Good => (
                record.repetitions.saturating_add(1),
                ease,
                self.good_interval(interval, ease) as u32,
            ),
            ReviewRating::Easy => (
                record.repetitions.saturating_add(1),
                ease + self.easy_reward,
                self.grow(
                    (interval * ease * self.easy_bonus).round(),
                    self.good_interval(interval, ease),
                ),
            ),
        };

        let new_ease = new_ease.max(self.minimum_ease);

        tracing::debug!(
            word_id = %record.word_id,
            %rating,
            interval = new_interval,
            ease_factor = new_ease,
            "scheduled review"
        );

        SrsRecord {
            word_id: record.word_id.clone(),
            interval: new_interval,
            repetitions,
            ease_factor: new_ease,
            last_reviewed_date: now,
            next_review_date: now + Duration::days(i64::from(new_interval)),
        }
    }
}
