use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::evaluator::{Evaluation, MIN_EASE_FACTOR, SrsState};

/// Per (user, item) spaced-repetition state. One record per pair; owned
/// exclusively by that pair and mutated only by review submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub user_id: i32,
    pub item_id: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_date: NaiveDate,
    pub last_reviewed_date: Option<NaiveDate>,
    /// Count of "forgot" outcomes. Due-list tie-break only, never fed back
    /// into the scheduling math.
    pub times_forgotten: i32,
}

fn add_days(date: NaiveDate, days: i32) -> NaiveDate {
    date.checked_add_days(Days::new(days.max(0) as u64))
        .unwrap_or(date)
}

impl ScheduleRecord {
    /// Fresh record for an explicit "add to review system" action. Not yet
    /// reviewed; due after the track's initial interval.
    pub fn seed(user_id: i32, item_id: i32, config: &SchedulerConfig, today: NaiveDate) -> Self {
        ScheduleRecord {
            user_id,
            item_id,
            ease_factor: config.initial_ease,
            interval_days: config.initial_interval_days,
            repetitions: 0,
            next_review_date: add_days(today, config.initial_interval_days),
            last_reviewed_date: None,
            times_forgotten: 0,
        }
    }

    /// Fresh record created implicitly by a failed recall: due tomorrow,
    /// with the failure already counted.
    pub fn seed_failure(
        user_id: i32,
        item_id: i32,
        config: &SchedulerConfig,
        today: NaiveDate,
    ) -> Self {
        ScheduleRecord {
            user_id,
            item_id,
            ease_factor: config.initial_ease,
            interval_days: 1,
            repetitions: 0,
            next_review_date: add_days(today, 1),
            last_reviewed_date: Some(today),
            times_forgotten: 1,
        }
    }

    /// The slice of this record the evaluators operate on.
    pub fn state(&self) -> SrsState {
        SrsState {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
        }
    }

    /// Folds an evaluation back into the record and recomputes the next
    /// review date from `today`. After a failure the date offset is clamped
    /// to `min_interval_on_failure` while the stored interval keeps the
    /// evaluator's raw value.
    pub fn apply(&mut self, eval: &Evaluation, today: NaiveDate, min_interval_on_failure: i32) {
        self.ease_factor = eval.state.ease_factor;
        self.interval_days = eval.state.interval_days;
        self.repetitions = eval.state.repetitions;
        self.last_reviewed_date = Some(today);

        let offset = if eval.success {
            eval.state.interval_days
        } else {
            eval.state.interval_days.max(min_interval_on_failure)
        };
        self.next_review_date = add_days(today, offset);
    }

    /// Structural invariants every persisted record must satisfy.
    pub fn check_invariants(&self) -> Result<(), SchedulerError> {
        if self.ease_factor < MIN_EASE_FACTOR - 1e-9 {
            return Err(SchedulerError::Validation(format!(
                "ease factor {} below floor {MIN_EASE_FACTOR}",
                self.ease_factor
            )));
        }
        if self.interval_days < 0 || self.repetitions < 0 || self.times_forgotten < 0 {
            return Err(SchedulerError::Validation(
                "negative counter in schedule record".into(),
            ));
        }
        if let Some(last) = self.last_reviewed_date {
            if self.next_review_date < last {
                return Err(SchedulerError::Validation(
                    "next review scheduled before the last review".into(),
                ));
            }
        }
        Ok(())
    }
}
