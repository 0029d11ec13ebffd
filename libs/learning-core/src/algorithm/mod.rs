//! Spaced repetition scheduling.

pub mod sm2;

use crate::error::Result;
use crate::types::{ReviewRating, SrsRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interval in days each rating would produce for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPreview {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

/// Trait for spaced repetition schedulers.
///
/// Implementations are pure: every call is self-contained given a record,
/// a rating and the review time.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Fresh record for a word introduced at `now`.
    fn new_record(&self, word_id: &str, now: DateTime<Utc>) -> SrsRecord;

    /// Calculate the record after a review.
    fn review(&self, record: &SrsRecord, rating: ReviewRating, now: DateTime<Utc>) -> SrsRecord;

    /// Lowest ease factor a well-formed record may carry.
    fn minimum_ease(&self) -> f64;

    /// Review with an unvalidated rating. On error the caller's record is
    /// untouched since nothing is written in place.
    fn review_raw(
        &self,
        record: &SrsRecord,
        rating: &str,
        now: DateTime<Utc>,
    ) -> Result<SrsRecord> {
        let rating = rating.parse::<ReviewRating>()?;
        Ok(self.review(record, rating, now))
    }

    /// Review a word whose stored record may be missing or corrupt. Either
    /// case is treated as the word's first review.
    fn review_or_new(
        &self,
        record: Option<&SrsRecord>,
        word_id: &str,
        rating: ReviewRating,
        now: DateTime<Utc>,
    ) -> SrsRecord {
        match record {
            Some(existing) if existing.is_well_formed(self.minimum_ease()) => {
                self.review(existing, rating, now)
            }
            Some(existing) => {
                tracing::warn!(
                    word_id = %existing.word_id,
                    interval = existing.interval,
                    ease_factor = existing.ease_factor,
                    "malformed SRS record, treating as first review"
                );
                self.review(&self.new_record(word_id, now), rating, now)
            }
            None => self.review(&self.new_record(word_id, now), rating, now),
        }
    }

    /// Intervals for all four ratings, for "again ~1d / good ~3d" hints.
    fn preview(&self, record: &SrsRecord, now: DateTime<Utc>) -> IntervalPreview {
        IntervalPreview {
            again: self.review(record, ReviewRating::Again, now).interval,
            hard: self.review(record, ReviewRating::Hard, now).interval,
            good: self.review(record, ReviewRating::Good, now).interval,
            easy: self.review(record, ReviewRating::Easy, now).interval,
        }
    }
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SpacedRepetitionAlgorithm>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
