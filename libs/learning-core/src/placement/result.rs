//! Placement result aggregation.

use super::{TerminationReason, TestState};
use crate::config::PlacementConfig;
use crate::types::{CefrLevel, Skill};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-skill outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResult {
    /// Fraction correct, 0.0 when the skill was never tested.
    pub accuracy: f64,
    /// Final level shifted by the accuracy band. A skill that was never
    /// tested has no evidence to shift on, so it keeps the final level
    /// even though its accuracy reads 0.0.
    pub estimated_level: CefrLevel,
    pub correct: u32,
    pub total: u32,
}

/// A skill flagged for extra practice. The text shown to the learner is
/// authored content looked up by `message_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub skill: Skill,
    pub accuracy: f64,
    pub message_key: String,
}

/// Final outcome of a placement test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTestResult {
    pub final_level: CefrLevel,
    /// 0-100.
    pub confidence: u8,
    /// Seconds spent answering.
    pub duration: u32,
    pub skill_breakdown: BTreeMap<Skill, SkillResult>,
    pub recommendations: Vec<Recommendation>,
    pub suggested_start_week: u32,
    pub termination: TerminationReason,
    pub total_questions: usize,
    pub correct_answers: usize,
}

pub(crate) fn build(
    state: &TestState,
    termination: TerminationReason,
    config: &PlacementConfig,
) -> LevelTestResult {
    let final_level = state.current_level;
    let skill_breakdown = skill_breakdown(state, config);
    let recommendations = recommendations(&skill_breakdown, config);

    LevelTestResult {
        final_level,
        confidence: confidence(state, termination, config),
        duration: state.time_spent().round().min(f64::from(u32::MAX)) as u32,
        recommendations,
        skill_breakdown,
        suggested_start_week: suggested_start_week(final_level, config),
        termination,
        total_questions: state.answered_count(),
        correct_answers: state.correct_count(),
    }
}

/// Confidence grows with the number of answers and with how long the level
/// has held still; ending at the cap while still moving, or on an exhausted
/// bank, costs points.
pub fn confidence(
    state: &TestState,
    termination: TerminationReason,
    config: &PlacementConfig,
) -> u8 {
    let window = config.confidence_window.max(1);
    let answered = state.answered_count() as f64;
    let coverage = (answered / config.max_questions.max(1) as f64).min(1.0);
    let stable = state.stable_run().min(window);

    let mut score = 40.0 + 20.0 * coverage + 40.0 * stable as f64 / window as f64;
    match termination {
        TerminationReason::HardCap if stable < config.stability_window => score -= 10.0,
        TerminationReason::BankExhausted => score -= 15.0,
        _ => {}
    }
    score.round().clamp(0.0, 100.0) as u8
}

fn skill_breakdown(state: &TestState, config: &PlacementConfig) -> BTreeMap<Skill, SkillResult> {
    let final_level = state.current_level;
    Skill::ALL
        .into_iter()
        .map(|skill| {
            let tally = state.tally(skill);
            let accuracy = tally.accuracy();
            let estimated_level = if tally.total == 0 {
                final_level
            } else if accuracy < config.weak_accuracy {
                final_level.demoted(config.min_level)
            } else if accuracy > config.strong_accuracy {
                final_level.promoted(config.max_level)
            } else {
                final_level
            };
            (
                skill,
                SkillResult {
                    accuracy,
                    estimated_level,
                    correct: tally.correct,
                    total: tally.total,
                },
            )
        })
        .collect()
}

/// Weakest tested skill, plus the runner-up when it is also below the
/// configured threshold. Ties keep skill declaration order.
fn recommendations(
    breakdown: &BTreeMap<Skill, SkillResult>,
    config: &PlacementConfig,
) -> Vec<Recommendation> {
    let mut tested: Vec<(Skill, f64)> = breakdown
        .iter()
        .filter(|(_, r)| r.total > 0)
        .map(|(skill, r)| (*skill, r.accuracy))
        .collect();
    tested.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    tested
        .into_iter()
        .enumerate()
        .take_while(|(rank, (_, accuracy))| {
            *rank == 0 || (*rank == 1 && *accuracy < config.second_recommendation_below)
        })
        .map(|(_, (skill, accuracy))| Recommendation {
            skill,
            accuracy,
            message_key: format!("placement.recommendation.{skill}"),
        })
        .collect()
}

/// First curriculum week of a level's block.
pub fn suggested_start_week(level: CefrLevel, config: &PlacementConfig) -> u32 {
    let offset = level.index().saturating_sub(config.min_level.index()) as u32;
    offset * config.weeks_per_level + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::tests::full_bank;
    use crate::placement::PlacementEngine;
    use pretty_assertions::assert_eq;

    fn finish(pattern: impl Fn(usize) -> bool) -> LevelTestResult {
        let bank = full_bank(5);
        let engine = PlacementEngine::with_defaults(&bank);
        let mut state = engine.create_default_session();
        let mut n = 0;
        loop {
            let q = engine.next_question(&state).unwrap();
            let index = if pattern(n) { q.correct_answer } else { q.correct_answer + 1 };
            let sub = engine.submit_answer(&state, q, index, 12.4).unwrap();
            state = sub.state;
            n += 1;
            if !sub.should_continue {
                return engine.result(&state).unwrap();
            }
        }
    }

    #[test]
    fn perfect_run_places_at_b2() {
        let result = finish(|_| true);
        assert_eq!(result.final_level, CefrLevel::B2);
        assert_eq!(result.termination, TerminationReason::Stable);
        assert_eq!(result.total_questions, 15);
        assert_eq!(result.correct_answers, 15);
        assert_eq!(result.suggested_start_week, 13);
        assert_eq!(result.duration, 186);
        // 40 + 20 * 15/30 + 40 * 6/6
        assert_eq!(result.confidence, 90);

        for skill in Skill::ALL {
            let breakdown = &result.skill_breakdown[&skill];
            assert_eq!(breakdown.accuracy, 1.0);
            assert_eq!(breakdown.estimated_level, CefrLevel::B2);
        }
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].skill, Skill::Vocabulary);
    }

    #[test]
    fn failing_run_places_at_a1() {
        let result = finish(|_| false);
        assert_eq!(result.final_level, CefrLevel::A1);
        assert_eq!(result.suggested_start_week, 1);
        let flagged: Vec<Skill> = result.recommendations.iter().map(|r| r.skill).collect();
        assert_eq!(flagged, vec![Skill::Vocabulary, Skill::Grammar]);
        assert_eq!(
            result.recommendations[1].message_key,
            "placement.recommendation.grammar"
        );
        assert_eq!(
            result.skill_breakdown[&Skill::Reading].estimated_level,
            CefrLevel::A1
        );
    }

    #[test]
    fn oscillating_run_has_lower_confidence() {
        let result = finish(|n| n % 4 < 2);
        assert_eq!(result.termination, TerminationReason::HardCap);
        // the 30th answer completes a promotion: 40 + 20 + 0 - 10
        assert_eq!(result.confidence, 50);
        assert!(result.confidence < finish(|_| true).confidence);
    }

    #[test]
    fn start_weeks_increase_with_level() {
        let config = PlacementConfig::default();
        let weeks: Vec<u32> = [CefrLevel::A1, CefrLevel::A2, CefrLevel::B1, CefrLevel::B2]
            .into_iter()
            .map(|level| suggested_start_week(level, &config))
            .collect();
        assert_eq!(weeks, vec![1, 5, 9, 13]);
    }

    #[test]
    fn untested_skill_keeps_final_level_and_is_not_flagged() {
        let mut state = crate::placement::TestState::new(CefrLevel::B1);
        state
            .skill_tallies
            .insert(Skill::Grammar, crate::types::SkillTally { correct: 1, total: 4 });
        state.completed = Some(TerminationReason::BankExhausted);
        let result = build(&state, TerminationReason::BankExhausted, &PlacementConfig::default());

        let listening = &result.skill_breakdown[&Skill::Listening];
        assert_eq!(listening.accuracy, 0.0);
        assert_eq!(listening.estimated_level, CefrLevel::B1);
        assert_eq!(
            result.skill_breakdown[&Skill::Grammar].estimated_level,
            CefrLevel::A2
        );
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].skill, Skill::Grammar);
        // 40 + 0 + 0 - 15
        assert_eq!(result.confidence, 25);
    }

    #[test]
    fn result_serializes_with_camel_case() {
        let result = finish(|_| true);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["finalLevel"], "B2");
        assert_eq!(json["suggestedStartWeek"], 13);
        assert!(json["skillBreakdown"]["grammar"]["estimatedLevel"].is_string());
    }
}
