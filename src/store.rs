use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::config::Track;
use crate::error::StoreError;
use crate::record::ScheduleRecord;
use crate::schema::schedule_records;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Persistence collaborator for schedule records, keyed by (user, item).
/// Implementations must execute each mutation as one atomic operation so a
/// read-modify-write cycle cannot interleave with another write to the same
/// record.
pub trait ScheduleStore: Send + Sync {
    fn find_one(&self, user_id: i32, item_id: i32) -> Result<Option<ScheduleRecord>, StoreError>;

    /// Insert-if-absent. Returns `Ok(false)` when a record for the pair
    /// already exists (uniqueness violations are not errors).
    fn insert_new(&self, record: &ScheduleRecord) -> Result<bool, StoreError>;

    /// Overwrite an existing record. Returns `Ok(false)` when it is absent.
    fn update(&self, record: &ScheduleRecord) -> Result<bool, StoreError>;

    /// Returns `Ok(false)` when there was nothing to delete.
    fn delete(&self, user_id: i32, item_id: i32) -> Result<bool, StoreError>;

    fn list_for_user(&self, user_id: i32) -> Result<Vec<ScheduleRecord>, StoreError>;
}

fn track_code(track: Track) -> i32 {
    match track {
        Track::Graded => 0,
        Track::Binary => 1,
    }
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schedule_records)]
struct ScheduleRow {
    user_id: i32,
    item_id: i32,
    track: i32,
    ease_factor: f64,
    interval_days: i32,
    repetitions: i32,
    next_review_date: NaiveDate,
    last_reviewed_date: Option<NaiveDate>,
    times_forgotten: i32,
}

impl ScheduleRow {
    fn from_record(record: &ScheduleRecord, track: Track) -> Self {
        ScheduleRow {
            user_id: record.user_id,
            item_id: record.item_id,
            track: track_code(track),
            ease_factor: record.ease_factor,
            interval_days: record.interval_days,
            repetitions: record.repetitions,
            next_review_date: record.next_review_date,
            last_reviewed_date: record.last_reviewed_date,
            times_forgotten: record.times_forgotten,
        }
    }

    fn into_record(self) -> ScheduleRecord {
        ScheduleRecord {
            user_id: self.user_id,
            item_id: self.item_id,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
            next_review_date: self.next_review_date,
            last_reviewed_date: self.last_reviewed_date,
            times_forgotten: self.times_forgotten,
        }
    }
}

/// SQLite-backed store. Both tracks share one table; the track code is part
/// of the primary key and stays invisible to callers.
pub struct DieselScheduleStore {
    pool: DbPool,
    track: Track,
}

impl DieselScheduleStore {
    pub fn new(pool: DbPool, track: Track) -> Self {
        DieselScheduleStore { pool, track }
    }
}

impl ScheduleStore for DieselScheduleStore {
    fn find_one(&self, user_id: i32, item_id: i32) -> Result<Option<ScheduleRecord>, StoreError> {
        let mut conn = self.pool.get()?;
        let row = schedule_records::table
            .filter(schedule_records::user_id.eq(user_id))
            .filter(schedule_records::item_id.eq(item_id))
            .filter(schedule_records::track.eq(track_code(self.track)))
            .first::<ScheduleRow>(&mut conn)
            .optional()?;
        Ok(row.map(ScheduleRow::into_record))
    }

    fn insert_new(&self, record: &ScheduleRecord) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(schedule_records::table)
            .values(&ScheduleRow::from_record(record, self.track))
            .on_conflict((
                schedule_records::user_id,
                schedule_records::item_id,
                schedule_records::track,
            ))
            .do_nothing()
            .execute(&mut conn)?;
        Ok(inserted == 1)
    }

    fn update(&self, record: &ScheduleRecord) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            schedule_records::table
                .filter(schedule_records::user_id.eq(record.user_id))
                .filter(schedule_records::item_id.eq(record.item_id))
                .filter(schedule_records::track.eq(track_code(self.track))),
        )
        .set((
            schedule_records::ease_factor.eq(record.ease_factor),
            schedule_records::interval_days.eq(record.interval_days),
            schedule_records::repetitions.eq(record.repetitions),
            schedule_records::next_review_date.eq(record.next_review_date),
            schedule_records::last_reviewed_date.eq(record.last_reviewed_date),
            schedule_records::times_forgotten.eq(record.times_forgotten),
        ))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn delete(&self, user_id: i32, item_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            schedule_records::table
                .filter(schedule_records::user_id.eq(user_id))
                .filter(schedule_records::item_id.eq(item_id))
                .filter(schedule_records::track.eq(track_code(self.track))),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_for_user(&self, user_id: i32) -> Result<Vec<ScheduleRecord>, StoreError> {
        let mut conn = self.pool.get()?;
        let rows = schedule_records::table
            .filter(schedule_records::user_id.eq(user_id))
            .filter(schedule_records::track.eq(track_code(self.track)))
            .load::<ScheduleRow>(&mut conn)?;
        Ok(rows.into_iter().map(ScheduleRow::into_record).collect())
    }
}

/// In-process store used by the integration tests and embedders that do not
/// need durability. The single mutex serializes every mutation, which covers
/// the one-writer-per-record requirement.
#[derive(Default)]
pub struct MemoryScheduleStore {
    records: Mutex<HashMap<(i32, i32), ScheduleRecord>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(i32, i32), ScheduleRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("schedule store mutex poisoned".into()))
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn find_one(&self, user_id: i32, item_id: i32) -> Result<Option<ScheduleRecord>, StoreError> {
        Ok(self.lock()?.get(&(user_id, item_id)).cloned())
    }

    fn insert_new(&self, record: &ScheduleRecord) -> Result<bool, StoreError> {
        let mut records = self.lock()?;
        let key = (record.user_id, record.item_id);
        if records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, record.clone());
        Ok(true)
    }

    fn update(&self, record: &ScheduleRecord) -> Result<bool, StoreError> {
        let mut records = self.lock()?;
        let key = (record.user_id, record.item_id);
        if !records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, record.clone());
        Ok(true)
    }

    fn delete(&self, user_id: i32, item_id: i32) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(&(user_id, item_id)).is_some())
    }

    fn list_for_user(&self, user_id: i32) -> Result<Vec<ScheduleRecord>, StoreError> {
        let mut records: Vec<ScheduleRecord> = self
            .lock()?
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        // Map iteration order is arbitrary; give the due query a stable base.
        records.sort_by_key(|record| record.item_id);
        Ok(records)
    }
}

/// Creates the tables on startup when they do not exist yet. The schema
/// matches `src/schema.rs`.
pub fn initialize_schema(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.batch_execute(
        "CREATE TABLE IF NOT EXISTS schedule_records (
            user_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            track INTEGER NOT NULL,
            ease_factor DOUBLE NOT NULL,
            interval_days INTEGER NOT NULL,
            repetitions INTEGER NOT NULL,
            next_review_date DATE NOT NULL,
            last_reviewed_date DATE,
            times_forgotten INTEGER NOT NULL,
            PRIMARY KEY (user_id, item_id, track)
        );
        CREATE TABLE IF NOT EXISTS vocabulary_items (
            item_id INTEGER PRIMARY KEY NOT NULL,
            word TEXT NOT NULL,
            phonetic TEXT NOT NULL,
            definition TEXT NOT NULL
        );",
    )?;
    Ok(())
}
