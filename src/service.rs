use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::catalog::{VocabularyCatalog, VocabularyItem};
use crate::config::SchedulerConfig;
use crate::due;
use crate::error::SchedulerError;
use crate::evaluator::{BinarySm2, ReviewOutcomeEvaluator, ReviewSignal};
use crate::record::ScheduleRecord;
use crate::store::ScheduleStore;

/// Result of submitting a review for a tracked item.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewResult {
    Updated(ScheduleRecord),
    /// Sustained success hit the track's exit threshold; the record was
    /// deleted and the item left active review.
    Mastered,
    /// The item has no schedule record. Only previously-tracked items are
    /// reviewable; the caller decides whether to start tracking.
    NotTracked,
}

/// One due record joined with its catalog display data.
#[derive(Debug, Clone, Serialize)]
pub struct DueItem {
    pub record: ScheduleRecord,
    pub item: VocabularyItem,
}

#[derive(Debug, Clone, Serialize)]
pub struct DueList {
    pub items: Vec<DueItem>,
    pub count: usize,
}

/// Aggregate view of one user's tracked items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    pub total: usize,
    pub due: usize,
    pub learning: usize,
    pub mastered: usize,
}

/// Orchestrates evaluator, store and catalog for one scheduling track:
/// fetches or creates the record, evaluates the outcome, persists the new
/// state and applies the mastery-exit rule. Reviews are short synchronous
/// read-modify-write cycles; atomicity per record is the store's contract.
pub struct SchedulingService<S, C> {
    store: S,
    catalog: C,
    config: SchedulerConfig,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_key(user_id: i32, item_id: i32) -> Result<(), SchedulerError> {
    if user_id <= 0 {
        return Err(SchedulerError::Validation(format!(
            "user id must be positive, got {user_id}"
        )));
    }
    if item_id <= 0 {
        return Err(SchedulerError::Validation(format!(
            "item id must be positive, got {item_id}"
        )));
    }
    Ok(())
}

impl<S: ScheduleStore, C: VocabularyCatalog> SchedulingService<S, C> {
    pub fn new(store: S, catalog: C, config: SchedulerConfig) -> Self {
        SchedulingService {
            store,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Explicitly adds an item to the review system. Idempotent: an already
    /// tracked item is returned unchanged.
    pub fn track_item(&self, user_id: i32, item_id: i32) -> Result<ScheduleRecord, SchedulerError> {
        self.track_item_at(user_id, item_id, today())
    }

    pub fn track_item_at(
        &self,
        user_id: i32,
        item_id: i32,
        as_of: NaiveDate,
    ) -> Result<ScheduleRecord, SchedulerError> {
        validate_key(user_id, item_id)?;
        if !self.catalog.item_exists(item_id)? {
            return Err(SchedulerError::ItemNotFound(item_id));
        }

        let seed = ScheduleRecord::seed(user_id, item_id, &self.config, as_of);
        seed.check_invariants()?;
        if self.store.insert_new(&seed)? {
            return Ok(seed);
        }
        self.store
            .find_one(user_id, item_id)?
            .ok_or(SchedulerError::NotFound { user_id, item_id })
    }

    /// Records a failed recall, creating the schedule record if the item was
    /// not tracked yet. An existing record takes a "forgot" outcome. Safe
    /// under duplicate concurrent calls: a lost insert race falls through to
    /// the update path instead of double-creating.
    pub fn register_failure(
        &self,
        user_id: i32,
        item_id: i32,
    ) -> Result<ScheduleRecord, SchedulerError> {
        self.register_failure_at(user_id, item_id, today())
    }

    pub fn register_failure_at(
        &self,
        user_id: i32,
        item_id: i32,
        as_of: NaiveDate,
    ) -> Result<ScheduleRecord, SchedulerError> {
        validate_key(user_id, item_id)?;
        if !self.catalog.item_exists(item_id)? {
            return Err(SchedulerError::ItemNotFound(item_id));
        }

        let seed = ScheduleRecord::seed_failure(user_id, item_id, &self.config, as_of);
        seed.check_invariants()?;
        if self.store.insert_new(&seed)? {
            return Ok(seed);
        }

        let mut record = self
            .store
            .find_one(user_id, item_id)?
            .ok_or(SchedulerError::NotFound { user_id, item_id })?;
        let eval = BinarySm2.evaluate(ReviewSignal::Forgot, &record.state())?;
        record.apply(&eval, as_of, self.config.min_interval_on_failure);
        record.times_forgotten += 1;
        record.check_invariants()?;
        if !self.store.update(&record)? {
            return Err(SchedulerError::NotFound { user_id, item_id });
        }
        Ok(record)
    }

    /// Submits a review for an already tracked item, running the track's
    /// strategy and then the mastery-exit rule. Untracked items yield
    /// `NotTracked` rather than an error.
    pub fn register_success(
        &self,
        user_id: i32,
        item_id: i32,
        signal: ReviewSignal,
    ) -> Result<ReviewResult, SchedulerError> {
        self.register_success_at(user_id, item_id, signal, today())
    }

    pub fn register_success_at(
        &self,
        user_id: i32,
        item_id: i32,
        signal: ReviewSignal,
        as_of: NaiveDate,
    ) -> Result<ReviewResult, SchedulerError> {
        validate_key(user_id, item_id)?;

        let Some(mut record) = self.store.find_one(user_id, item_id)? else {
            return Ok(ReviewResult::NotTracked);
        };

        let eval = self.config.evaluator().evaluate(signal, &record.state())?;
        record.apply(&eval, as_of, self.config.min_interval_on_failure);
        if signal == ReviewSignal::Forgot {
            record.times_forgotten += 1;
        }
        record.check_invariants()?;

        if eval.success {
            if let Some(threshold) = self.config.mastery_exit_threshold {
                if record.repetitions >= threshold {
                    self.store.delete(user_id, item_id)?;
                    return Ok(ReviewResult::Mastered);
                }
            }
        }

        if !self.store.update(&record)? {
            return Err(SchedulerError::NotFound { user_id, item_id });
        }
        Ok(ReviewResult::Updated(record))
    }

    /// Due records for a user, oldest-overdue first, decorated with catalog
    /// display data. Pure read.
    pub fn get_due(&self, user_id: i32, as_of: NaiveDate) -> Result<DueList, SchedulerError> {
        if user_id <= 0 {
            return Err(SchedulerError::Validation(format!(
                "user id must be positive, got {user_id}"
            )));
        }

        let records = self.store.list_for_user(user_id)?;
        let mut items = Vec::new();
        for record in due::due_records(records, as_of) {
            let item = self
                .catalog
                .get_item(record.item_id)?
                .ok_or(SchedulerError::ItemNotFound(record.item_id))?;
            items.push(DueItem { record, item });
        }
        Ok(DueList {
            count: items.len(),
            items,
        })
    }

    /// Aggregate counts over a user's tracked items. The learning/mastered
    /// split uses the track's stats threshold, which is deliberately
    /// independent of the mastery-exit threshold.
    pub fn get_stats(&self, user_id: i32, as_of: NaiveDate) -> Result<ReviewStats, SchedulerError> {
        if user_id <= 0 {
            return Err(SchedulerError::Validation(format!(
                "user id must be positive, got {user_id}"
            )));
        }

        let records = self.store.list_for_user(user_id)?;
        let total = records.len();
        let due = records
            .iter()
            .filter(|record| record.next_review_date <= as_of)
            .count();
        let mastered = records
            .iter()
            .filter(|record| record.repetitions >= self.config.mastery_stats_threshold)
            .count();

        Ok(ReviewStats {
            total,
            due,
            learning: total - mastered,
            mastered,
        })
    }

    /// Drops an item from active review.
    pub fn remove(&self, user_id: i32, item_id: i32) -> Result<(), SchedulerError> {
        validate_key(user_id, item_id)?;
        if !self.store.delete(user_id, item_id)? {
            return Err(SchedulerError::NotFound { user_id, item_id });
        }
        Ok(())
    }
}
