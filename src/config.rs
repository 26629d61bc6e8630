use serde::{Deserialize, Serialize};

use crate::evaluator::{BinarySm2, GradedSm2, ReviewOutcomeEvaluator};

/// Ease factor assigned to newly tracked items.
pub const DEFAULT_INITIAL_EASE: f64 = 2.5;

/// Consecutive successes after which the binary track drops a record.
pub const DEFAULT_BINARY_MASTERY_EXIT: i32 = 5;

/// Which scheduling variant a service instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Full SM-2 with a 0-5 recall quality signal (flashcard deck).
    Graded,
    /// Simplified forgot/remembered SM-2 (rapid-recall drill).
    Binary,
}

/// Scheduling policy for one track. All thresholds that differ between the
/// graded and binary variants live here instead of at the call sites.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub track: Track,
    /// Ease factor for freshly created records.
    pub initial_ease: f64,
    /// Days until the first review of an explicitly tracked item.
    pub initial_interval_days: i32,
    /// Lower bound on the next-review offset after a failed review.
    /// 0 lets a failed item come due again the same day; 1 defers it to
    /// tomorrow.
    pub min_interval_on_failure: i32,
    /// Repetition count at which a successful review deletes the record.
    /// `None` disables the mastery exit.
    pub mastery_exit_threshold: Option<i32>,
    /// Repetition count at or above which stats report an item as mastered.
    /// Independent of the exit threshold.
    pub mastery_stats_threshold: i32,
}

impl SchedulerConfig {
    /// Flashcard-deck defaults: no auto-removal, items seeded due today.
    pub fn graded() -> Self {
        SchedulerConfig {
            track: Track::Graded,
            initial_ease: DEFAULT_INITIAL_EASE,
            initial_interval_days: 0,
            min_interval_on_failure: 1,
            mastery_exit_threshold: None,
            mastery_stats_threshold: 3,
        }
    }

    /// Rapid-recall drill defaults: auto-removal after five consecutive
    /// successes, nothing comes due the day it was reviewed.
    pub fn binary() -> Self {
        SchedulerConfig {
            track: Track::Binary,
            initial_ease: DEFAULT_INITIAL_EASE,
            initial_interval_days: 1,
            min_interval_on_failure: 1,
            mastery_exit_threshold: Some(DEFAULT_BINARY_MASTERY_EXIT),
            mastery_stats_threshold: DEFAULT_BINARY_MASTERY_EXIT,
        }
    }

    /// The evaluator strategy for this track.
    pub fn evaluator(&self) -> &'static dyn ReviewOutcomeEvaluator {
        match self.track {
            Track::Graded => &GradedSm2,
            Track::Binary => &BinarySm2,
        }
    }
}
