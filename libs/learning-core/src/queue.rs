//! Review queue building and daily progress.

use crate::calendar::{same_study_day, study_day, study_day_end};
use crate::config::QueueSettings;
use crate::types::SrsRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Interval (days) from which a word counts as mature.
pub const MATURE_INTERVAL_DAYS: u32 = 21;

/// Reviews done today against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayProgress {
    pub done: u32,
    pub goal: u32,
}

impl TodayProgress {
    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.done)
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.goal
    }
}

/// Words to study in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQueue {
    pub review_words: Vec<SrsRecord>,
    pub new_words: Vec<String>,
    pub review_remaining: u32,
    pub new_remaining: u32,
}

/// Aggregate view of a learner's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total: usize,
    /// Due right now.
    pub due: usize,
    /// Due before the current study day ends.
    pub due_today: usize,
    pub reviewed_today: usize,
    pub mature: usize,
    pub average_ease: f64,
    pub average_interval: f64,
}

/// Due records, most overdue first, at most `limit` of them.
///
/// Ties on the due date are broken by word id so repeated calls over the
/// same records return the same order.
pub fn get_words_for_review(
    records: &[SrsRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<SrsRecord> {
    let mut due: Vec<&SrsRecord> = records.iter().filter(|r| r.is_due(now)).collect();
    due.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then_with(|| a.word_id.cmp(&b.word_id))
    });
    due.into_iter().take(limit).cloned().collect()
}

/// Records reviewed during the current study day.
pub fn get_today_progress(
    records: &[SrsRecord],
    now: DateTime<Utc>,
    daily_goal: u32,
    settings: &QueueSettings,
) -> TodayProgress {
    let done = records
        .iter()
        .filter(|r| same_study_day(r.last_reviewed_date, now, settings))
        .count();
    TodayProgress {
        done: u32::try_from(done).unwrap_or(u32::MAX),
        goal: daily_goal,
    }
}

/// Build a session: due reviews up to what is left of the daily goal, plus
/// unseen words from `candidates` up to the new-word limit.
pub fn build_study_queue<'a>(
    records: &[SrsRecord],
    candidates: impl IntoIterator<Item = &'a str>,
    now: DateTime<Utc>,
    settings: &QueueSettings,
) -> StudyQueue {
    let progress = get_today_progress(records, now, settings.daily_goal, settings);
    let review_budget = progress.remaining();
    let review_words = get_words_for_review(records, now, review_budget as usize);

    let known: HashSet<&str> = records.iter().map(|r| r.word_id.as_str()).collect();
    let mut seen = HashSet::new();
    let new_words: Vec<String> = candidates
        .into_iter()
        .filter(|id| !known.contains(id) && seen.insert(*id))
        .take(settings.new_words_per_day as usize)
        .map(str::to_string)
        .collect();

    tracing::debug!(
        done_today = progress.done,
        reviews = review_words.len(),
        new_words = new_words.len(),
        "built study queue"
    );

    StudyQueue {
        review_remaining: review_budget.saturating_sub(review_words.len() as u32),
        new_remaining: settings
            .new_words_per_day
            .saturating_sub(new_words.len() as u32),
        review_words,
        new_words,
    }
}

pub fn review_stats(
    records: &[SrsRecord],
    now: DateTime<Utc>,
    settings: &QueueSettings,
) -> ReviewStats {
    let day_end = study_day_end(study_day(now, settings), settings);
    let total = records.len();

    let (ease_sum, interval_sum) = records.iter().fold((0.0, 0.0), |(e, i), r| {
        (e + r.ease_factor, i + f64::from(r.interval))
    });
    let (average_ease, average_interval) = if total == 0 {
        (0.0, 0.0)
    } else {
        (ease_sum / total as f64, interval_sum / total as f64)
    };

    ReviewStats {
        total,
        due: records.iter().filter(|r| r.is_due(now)).count(),
        due_today: records
            .iter()
            .filter(|r| r.next_review_date < day_end)
            .count(),
        reviewed_today: records
            .iter()
            .filter(|r| same_study_day(r.last_reviewed_date, now, settings))
            .count(),
        mature: records
            .iter()
            .filter(|r| r.interval >= MATURE_INTERVAL_DAYS)
            .count(),
        average_ease,
        average_interval,
    }
}
