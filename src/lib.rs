//! Spaced-repetition scheduling engine for a vocabulary trainer.
//!
//! The engine decides, per (user, item) pair, when the item is next due for
//! review and how its difficulty parameters evolve with recall performance.
//! Two variants run behind one evaluator seam: full graded SM-2 for the
//! flashcard deck and a binary forgot/remembered simplification for the
//! rapid-recall drill.

pub mod api;
pub mod catalog;
pub mod config;
pub mod due;
pub mod error;
pub mod evaluator;
pub mod record;
pub mod schema;
pub mod service;
pub mod store;

pub use catalog::{MemoryCatalog, VocabularyCatalog, VocabularyItem};
pub use config::{SchedulerConfig, Track};
pub use error::{SchedulerError, StoreError};
pub use evaluator::{BinarySm2, GradedSm2, ReviewOutcomeEvaluator, ReviewSignal, SrsState};
pub use record::ScheduleRecord;
pub use service::{DueItem, DueList, ReviewResult, ReviewStats, SchedulingService};
pub use store::{MemoryScheduleStore, ScheduleStore};
