//! Adaptive learning engine shared by the mobile client and its services.
//!
//! Provides:
//! - Adaptive CEFR placement test (question selection, level steering, result)
//! - SM-2 style spaced repetition scheduling for vocabulary
//! - Review queue building and daily progress
//! - Storage collaborator traits with an in-memory implementation

pub mod algorithm;
pub mod bank;
pub mod calendar;
pub mod config;
pub mod error;
pub mod placement;
pub mod queue;
pub mod store;
pub mod types;

pub use algorithm::sm2::Sm2;
pub use algorithm::{get_algorithm, IntervalPreview, SpacedRepetitionAlgorithm};
pub use bank::{QuestionBank, TestQuestion};
pub use config::{EngineConfig, PlacementConfig, QueueSettings};
pub use error::{EngineError, Result};
pub use placement::result::{LevelTestResult, Recommendation, SkillResult};
pub use placement::{
    AnsweredQuestion, PlacementEngine, Submission, TerminationReason, TestProgress, TestState,
};
pub use queue::{
    build_study_queue, get_today_progress, get_words_for_review, review_stats, ReviewStats,
    StudyQueue, TodayProgress,
};
pub use store::{apply_review, MemoryStore, ProfileStore, SrsRecordStore, StoreSnapshot};
pub use types::{CefrLevel, ReviewRating, Skill, SkillTally, SrsRecord};
