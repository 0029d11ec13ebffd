//! Engine configuration.
//!
//! Every section has defaults, so a partial JSON document only needs the
//! fields it overrides.

use crate::algorithm::sm2::Sm2;
use crate::error::{EngineError, Result};
use crate::types::CefrLevel;
use serde::{Deserialize, Serialize};

/// Placement test tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub initial_level: CefrLevel,
    pub min_level: CefrLevel,
    pub max_level: CefrLevel,
    /// Consecutive correct answers that trigger a promotion.
    pub promote_streak: u32,
    /// Consecutive wrong answers that trigger a demotion.
    pub demote_streak: u32,
    pub min_questions: usize,
    /// Hard cap; the test always ends here.
    pub max_questions: usize,
    /// Answers without a level change that count as converged.
    pub stability_window: usize,
    /// Trailing answers considered when scoring confidence.
    pub confidence_window: usize,
    /// Curriculum weeks covered by each level.
    pub weeks_per_level: u32,
    /// Skill accuracy above this is estimated one level up.
    pub strong_accuracy: f64,
    /// Skill accuracy below this is estimated one level down.
    pub weak_accuracy: f64,
    /// A second weak skill is only flagged when its accuracy is below this.
    pub second_recommendation_below: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            initial_level: CefrLevel::A2,
            min_level: CefrLevel::A1,
            max_level: CefrLevel::B2,
            promote_streak: 2,
            demote_streak: 2,
            min_questions: 15,
            max_questions: 30,
            stability_window: 4,
            confidence_window: 6,
            weeks_per_level: 4,
            strong_accuracy: 0.8,
            weak_accuracy: 0.4,
            second_recommendation_below: 0.8,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_level > self.max_level {
            return Err(EngineError::InvalidConfig(format!(
                "min_level {} above max_level {}",
                self.min_level, self.max_level
            )));
        }
        if self.promote_streak == 0 || self.demote_streak == 0 {
            return Err(EngineError::InvalidConfig(
                "streak thresholds must be positive".to_string(),
            ));
        }
        if self.max_questions == 0 || self.min_questions > self.max_questions {
            return Err(EngineError::InvalidConfig(format!(
                "question range {}..={} is empty",
                self.min_questions, self.max_questions
            )));
        }
        if self.stability_window == 0 || self.confidence_window < self.stability_window {
            return Err(EngineError::InvalidConfig(
                "confidence_window must cover stability_window".to_string(),
            ));
        }
        if self.weeks_per_level == 0 {
            return Err(EngineError::InvalidConfig(
                "weeks_per_level must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.weak_accuracy)
            || !(0.0..=1.0).contains(&self.strong_accuracy)
            || self.weak_accuracy > self.strong_accuracy
        {
            return Err(EngineError::InvalidConfig(
                "accuracy bands must satisfy 0 <= weak <= strong <= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Daily review limits and the learner's study day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub daily_goal: u32,
    pub new_words_per_day: u32,
    /// Hour (0-23, local) at which a new study day begins.
    pub daily_reset_hour: u32,
    /// Learner's offset from UTC.
    pub utc_offset_minutes: i32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            daily_goal: 20,
            new_words_per_day: 10,
            daily_reset_hour: 0,
            // KST
            utc_offset_minutes: 9 * 60,
        }
    }
}

impl QueueSettings {
    pub fn validate(&self) -> Result<()> {
        if self.daily_reset_hour > 23 {
            return Err(EngineError::InvalidConfig(format!(
                "daily_reset_hour {} out of range",
                self.daily_reset_hour
            )));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(EngineError::InvalidConfig(format!(
                "utc_offset_minutes {} out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub placement: PlacementConfig,
    pub srs: Sm2,
    pub queue: QueueSettings,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.placement.validate()?;
        self.srs.validate()?;
        self.queue.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{"queue": {"daily_goal": 35}, "placement": {"initial_level": "B1"}}"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.queue.daily_goal, 35);
        assert_eq!(config.queue.new_words_per_day, 10);
        assert_eq!(config.placement.initial_level, CefrLevel::B1);
        assert_eq!(config.placement.max_questions, 30);
        assert_eq!(config.srs, Sm2::default());
    }

    #[test]
    fn rejects_inverted_level_window() {
        let result = EngineConfig::from_json(
            r#"{"placement": {"min_level": "B2", "max_level": "A2"}}"#,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_bad_reset_hour() {
        let result = EngineConfig::from_json(r#"{"queue": {"daily_reset_hour": 24}}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(EngineError::Json(_))
        ));
    }
}
