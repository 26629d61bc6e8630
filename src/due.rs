use chrono::NaiveDate;

use crate::record::ScheduleRecord;

/// Read-side due selection. Keeps records whose next review date has
/// arrived, oldest-overdue first, most-forgotten first among ties. Pure:
/// querying never mutates scheduling state, so repeated calls with no
/// intervening writes agree.
pub fn due_records(mut records: Vec<ScheduleRecord>, as_of: NaiveDate) -> Vec<ScheduleRecord> {
    records.retain(|record| record.next_review_date <= as_of);
    // Stable sort keeps the store's order for full ties.
    records.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then(b.times_forgotten.cmp(&a.times_forgotten))
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::record::ScheduleRecord;

    fn record(item_id: i32, next_review: &str, times_forgotten: i32) -> ScheduleRecord {
        let mut record =
            ScheduleRecord::seed_failure(1, item_id, &SchedulerConfig::binary(), "2026-08-01".parse().unwrap());
        record.next_review_date = next_review.parse().unwrap();
        record.times_forgotten = times_forgotten;
        record
    }

    #[test]
    fn filters_out_future_records() {
        let records = vec![
            record(1, "2026-08-29", 0),
            record(2, "2026-08-30", 0),
            record(3, "2026-09-01", 0),
        ];
        let due = due_records(records, "2026-08-30".parse().unwrap());
        let ids: Vec<i32> = due.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn orders_oldest_overdue_first_then_most_forgotten() {
        let records = vec![
            record(1, "2026-08-30", 0),
            record(2, "2026-08-20", 1),
            record(3, "2026-08-20", 4),
            record(4, "2026-08-25", 0),
        ];
        let due = due_records(records, "2026-08-30".parse().unwrap());
        let ids: Vec<i32> = due.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn repeated_queries_agree() {
        let records = vec![
            record(1, "2026-08-30", 2),
            record(2, "2026-08-30", 2),
            record(3, "2026-08-28", 0),
        ];
        let first = due_records(records.clone(), "2026-08-30".parse().unwrap());
        let second = due_records(records, "2026-08-30".parse().unwrap());
        assert_eq!(first, second);
    }
}
