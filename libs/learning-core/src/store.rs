//! Storage collaborator interfaces.
//!
//! The engine never performs I/O; callers persist records and the learner's
//! level through these traits. [`MemoryStore`] backs tests and offline use
//! and round-trips through the JSON shape of [`StoreSnapshot`].

use crate::algorithm::SpacedRepetitionAlgorithm;
use crate::error::Result;
use crate::placement::result::LevelTestResult;
use crate::types::{CefrLevel, ReviewRating, SrsRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistence for per-word memory records.
pub trait SrsRecordStore {
    fn get(&self, word_id: &str) -> Result<Option<SrsRecord>>;
    /// Insert or replace; the latest write wins.
    fn put(&mut self, record: SrsRecord) -> Result<()>;
    fn all(&self) -> Result<Vec<SrsRecord>>;
}

/// Persistence for the learner's placement level.
pub trait ProfileStore {
    fn current_level(&self) -> Result<Option<CefrLevel>>;
    fn set_current_level(&mut self, level: CefrLevel) -> Result<()>;

    fn record_placement(&mut self, result: &LevelTestResult) -> Result<()> {
        self.set_current_level(result.final_level)
    }
}

/// Review `word_id` and persist the new record.
///
/// Missing or malformed records are reviewed as new words. A review older
/// than the stored one is dropped so replays cannot roll a word back.
pub fn apply_review<S, A>(
    store: &mut S,
    algorithm: &A,
    word_id: &str,
    rating: ReviewRating,
    now: DateTime<Utc>,
) -> Result<SrsRecord>
where
    S: SrsRecordStore + ?Sized,
    A: SpacedRepetitionAlgorithm + ?Sized,
{
    let existing = store.get(word_id)?;
    if let Some(stored) = &existing {
        if stored.last_reviewed_date > now {
            tracing::warn!(
                word_id,
                stored = %stored.last_reviewed_date,
                review = %now,
                "ignoring review older than stored record"
            );
            return Ok(stored.clone());
        }
    }

    let updated = algorithm.review_or_new(existing.as_ref(), word_id, rating, now);
    store.put(updated.clone())?;
    Ok(updated)
}

/// Serializable contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub records: BTreeMap<String, SrsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_level: Option<CefrLevel>,
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, SrsRecord>,
    current_level: Option<CefrLevel>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
            current_level: self.current_level,
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            records: snapshot.records,
            current_level: snapshot.current_level,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

impl SrsRecordStore for MemoryStore {
    fn get(&self, word_id: &str) -> Result<Option<SrsRecord>> {
        Ok(self.records.get(word_id).cloned())
    }

    fn put(&mut self, record: SrsRecord) -> Result<()> {
        self.records.insert(record.word_id.clone(), record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<SrsRecord>> {
        Ok(self.records.values().cloned().collect())
    }
}

impl ProfileStore for MemoryStore {
    fn current_level(&self) -> Result<Option<CefrLevel>> {
        Ok(self.current_level)
    }

    fn set_current_level(&mut self, level: CefrLevel) -> Result<()> {
        self.current_level = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::sm2::Sm2;
    use crate::error::EngineError;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-02-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn first_review_creates_record() {
        let mut store = MemoryStore::new();
        let record = apply_review(&mut store, &Sm2::default(), "river", ReviewRating::Good, now())
            .unwrap();
        assert_eq!(record.interval, 3);
        assert_eq!(store.get("river").unwrap(), Some(record));
    }

    #[test]
    fn later_review_builds_on_stored_record() {
        let mut store = MemoryStore::new();
        let sm2 = Sm2::default();
        apply_review(&mut store, &sm2, "river", ReviewRating::Good, now()).unwrap();
        let second = apply_review(
            &mut store,
            &sm2,
            "river",
            ReviewRating::Good,
            now() + Duration::days(3),
        )
        .unwrap();
        // round(3 * 2.5)
        assert_eq!(second.interval, 8);
        assert_eq!(second.repetitions, 2);
    }

    #[test]
    fn stale_review_is_ignored() {
        let mut store = MemoryStore::new();
        let sm2 = Sm2::default();
        let latest = apply_review(
            &mut store,
            &sm2,
            "river",
            ReviewRating::Easy,
            now() + Duration::days(1),
        )
        .unwrap();
        let replay = apply_review(&mut store, &sm2, "river", ReviewRating::Again, now()).unwrap();
        assert_eq!(replay, latest);
        assert_eq!(store.get("river").unwrap(), Some(latest));
    }

    #[test]
    fn works_through_trait_objects() {
        let mut store = MemoryStore::new();
        let dyn_store: &mut dyn SrsRecordStore = &mut store;
        let algorithm: Box<dyn SpacedRepetitionAlgorithm> = Box::new(Sm2::default());
        apply_review(dyn_store, algorithm.as_ref(), "lake", ReviewRating::Hard, now()).unwrap();
        assert_eq!(store.len(), 1);
    }

    /// Store whose backing medium rejects writes.
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl SrsRecordStore for ReadOnlyStore {
        fn get(&self, word_id: &str) -> Result<Option<SrsRecord>> {
            self.inner.get(word_id)
        }

        fn put(&mut self, record: SrsRecord) -> Result<()> {
            Err(EngineError::Storage(format!(
                "read-only store cannot save {}",
                record.word_id
            )))
        }

        fn all(&self) -> Result<Vec<SrsRecord>> {
            self.inner.all()
        }
    }

    #[test]
    fn storage_failure_propagates() {
        let mut store = ReadOnlyStore {
            inner: MemoryStore::new(),
        };
        let result = apply_review(&mut store, &Sm2::default(), "river", ReviewRating::Good, now());
        match result {
            Err(EngineError::Storage(message)) => {
                assert_eq!(message, "read-only store cannot save river")
            }
            other => panic!("expected storage error, got {other:?}"),
        }
        assert!(store.inner.is_empty());
    }

    #[test]
    fn placement_sets_profile_level() {
        let mut store = MemoryStore::new();
        assert_eq!(store.current_level().unwrap(), None);
        store.set_current_level(CefrLevel::B1).unwrap();
        assert_eq!(store.current_level().unwrap(), Some(CefrLevel::B1));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = MemoryStore::new();
        let sm2 = Sm2::default();
        apply_review(&mut store, &sm2, "river", ReviewRating::Good, now()).unwrap();
        apply_review(&mut store, &sm2, "lake", ReviewRating::Again, now()).unwrap();
        store.set_current_level(CefrLevel::A2).unwrap();

        let json = store.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["currentLevel"], "A2");
        assert_eq!(value["records"]["river"]["wordId"], "river");

        let restored = MemoryStore::from_json(&json).unwrap();
        assert_eq!(restored.snapshot(), store.snapshot());
    }

    #[test]
    fn empty_snapshot_parses() {
        let store = MemoryStore::from_json("{}").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.current_level().unwrap(), None);
    }
}
