use chrono::NaiveDate;

use lexirep::{
    MemoryCatalog, MemoryScheduleStore, ReviewResult, ReviewSignal, ScheduleRecord, ScheduleStore,
    SchedulerConfig, SchedulerError, SchedulingService, VocabularyItem,
};

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn item(item_id: i32, word: &str) -> VocabularyItem {
    VocabularyItem {
        item_id,
        word: word.to_string(),
        phonetic: format!("/{word}/"),
        definition: format!("meaning of {word}"),
    }
}

fn catalog() -> MemoryCatalog {
    MemoryCatalog::with_items(vec![
        item(1, "apfel"),
        item(2, "birne"),
        item(3, "kirsche"),
        item(4, "traube"),
    ])
}

fn drill_service() -> SchedulingService<MemoryScheduleStore, MemoryCatalog> {
    SchedulingService::new(MemoryScheduleStore::new(), catalog(), SchedulerConfig::binary())
}

fn flashcard_service(config: SchedulerConfig) -> SchedulingService<MemoryScheduleStore, MemoryCatalog> {
    SchedulingService::new(MemoryScheduleStore::new(), catalog(), config)
}

#[test]
fn first_failure_creates_the_seed_record() {
    let service = drill_service();
    let today = day("2026-08-30");

    let record = service.register_failure_at(7, 1, today).unwrap();
    assert_eq!(record.ease_factor, 2.5);
    assert_eq!(record.repetitions, 0);
    assert_eq!(record.interval_days, 1);
    assert_eq!(record.next_review_date, day("2026-08-31"));
    assert_eq!(record.times_forgotten, 1);
    assert_eq!(record.last_reviewed_date, Some(today));
}

#[test]
fn duplicate_failure_falls_through_to_the_update_path() {
    let service = drill_service();
    let today = day("2026-08-30");

    service.register_failure_at(7, 1, today).unwrap();
    let record = service.register_failure_at(7, 1, today).unwrap();

    assert_eq!(record.times_forgotten, 2);
    assert_eq!(record.repetitions, 0);
    assert_eq!(record.interval_days, 1);
    assert_eq!(record.next_review_date, day("2026-08-31"));

    let stats = service.get_stats(7, today).unwrap();
    assert_eq!(stats.total, 1);
}

#[test]
fn failure_on_unknown_item_is_rejected() {
    let service = drill_service();
    assert!(matches!(
        service.register_failure_at(7, 99, day("2026-08-30")),
        Err(SchedulerError::ItemNotFound(99))
    ));
}

#[test]
fn invalid_ids_are_rejected() {
    let service = drill_service();
    assert!(matches!(
        service.register_failure_at(0, 1, day("2026-08-30")),
        Err(SchedulerError::Validation(_))
    ));
    assert!(matches!(
        service.register_failure_at(7, -2, day("2026-08-30")),
        Err(SchedulerError::Validation(_))
    ));
}

#[test]
fn review_of_an_untracked_item_reports_not_tracked() {
    let service = drill_service();
    let result = service
        .register_success_at(7, 1, ReviewSignal::Remembered, day("2026-08-30"))
        .unwrap();
    assert_eq!(result, ReviewResult::NotTracked);
}

#[test]
fn five_remembered_reviews_master_a_drill_item() {
    let service = drill_service();
    let mut date = day("2026-08-01");

    service.register_failure_at(7, 1, date).unwrap();

    for round in 1..=5 {
        date = date.succ_opt().unwrap();
        let result = service
            .register_success_at(7, 1, ReviewSignal::Remembered, date)
            .unwrap();
        if round < 5 {
            match result {
                ReviewResult::Updated(record) => assert_eq!(record.repetitions, round),
                other => panic!("expected an update at round {round}, got {other:?}"),
            }
        } else {
            assert_eq!(result, ReviewResult::Mastered);
        }
    }

    // The record is gone from every read path.
    let far_future = day("2030-01-01");
    assert_eq!(service.get_due(7, far_future).unwrap().count, 0);
    let stats = service.get_stats(7, far_future).unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(
        service
            .register_success_at(7, 1, ReviewSignal::Remembered, far_future)
            .unwrap(),
        ReviewResult::NotTracked
    );
}

#[test]
fn graded_track_keeps_records_past_five_repetitions() {
    let service = flashcard_service(SchedulerConfig::graded());
    let mut date = day("2026-08-01");

    service.track_item_at(7, 1, date).unwrap();
    for _ in 0..6 {
        date = date.succ_opt().unwrap();
        let result = service
            .register_success_at(7, 1, ReviewSignal::Quality(5), date)
            .unwrap();
        assert!(matches!(result, ReviewResult::Updated(_)));
    }

    let stats = service.get_stats(7, date).unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.mastered, 1);
    assert_eq!(stats.learning, 0);
}

#[test]
fn tracking_an_item_twice_is_idempotent() {
    let service = flashcard_service(SchedulerConfig::graded());
    let today = day("2026-08-30");

    let first = service.track_item_at(7, 1, today).unwrap();
    service
        .register_success_at(7, 1, ReviewSignal::Quality(4), today)
        .unwrap();
    let second = service.track_item_at(7, 1, today).unwrap();

    // The existing record wins; tracking again does not reset progress.
    assert_ne!(second, first);
    assert_eq!(second.repetitions, 1);
}

#[test]
fn graded_worked_example_six_days_becomes_fifteen() {
    let store = MemoryScheduleStore::new();
    let seeded = ScheduleRecord {
        user_id: 7,
        item_id: 1,
        ease_factor: 2.5,
        interval_days: 6,
        repetitions: 2,
        next_review_date: day("2026-08-30"),
        last_reviewed_date: Some(day("2026-08-24")),
        times_forgotten: 0,
    };
    store.insert_new(&seeded).unwrap();
    let service = SchedulingService::new(store, catalog(), SchedulerConfig::graded());

    let result = service
        .register_success_at(7, 1, ReviewSignal::Quality(4), day("2026-08-30"))
        .unwrap();
    let ReviewResult::Updated(record) = result else {
        panic!("expected an updated record");
    };
    assert_eq!(record.repetitions, 3);
    assert_eq!(record.interval_days, 15);
    assert_eq!(record.next_review_date, day("2026-09-14"));
}

#[test]
fn due_list_orders_and_decorates() {
    let store = MemoryScheduleStore::new();
    let base = ScheduleRecord {
        user_id: 7,
        item_id: 0,
        ease_factor: 2.5,
        interval_days: 1,
        repetitions: 0,
        next_review_date: day("2026-08-30"),
        last_reviewed_date: None,
        times_forgotten: 0,
    };
    for (item_id, next, forgotten) in [
        (1, "2026-08-30", 0),
        (2, "2026-08-20", 1),
        (3, "2026-08-20", 5),
        (4, "2026-09-09", 0),
    ] {
        let mut record = base.clone();
        record.item_id = item_id;
        record.next_review_date = day(next);
        record.times_forgotten = forgotten;
        store.insert_new(&record).unwrap();
    }
    let service = SchedulingService::new(store, catalog(), SchedulerConfig::binary());

    let due = service.get_due(7, day("2026-08-30")).unwrap();
    assert_eq!(due.count, 3);
    let ids: Vec<i32> = due.items.iter().map(|d| d.record.item_id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(due.items[0].item.word, "kirsche");

    // Pure read: asking again changes nothing.
    let again = service.get_due(7, day("2026-08-30")).unwrap();
    let again_ids: Vec<i32> = again.items.iter().map(|d| d.record.item_id).collect();
    assert_eq!(again_ids, ids);
    assert_eq!(again.count, due.count);
}

#[test]
fn stats_split_uses_the_graded_threshold() {
    let store = MemoryScheduleStore::new();
    let base = ScheduleRecord {
        user_id: 7,
        item_id: 0,
        ease_factor: 2.5,
        interval_days: 1,
        repetitions: 0,
        next_review_date: day("2026-09-05"),
        last_reviewed_date: None,
        times_forgotten: 0,
    };
    for (item_id, repetitions, next) in [
        (1, 0, "2026-08-29"),
        (2, 2, "2026-08-30"),
        (3, 3, "2026-09-05"),
        (4, 5, "2026-09-09"),
    ] {
        let mut record = base.clone();
        record.item_id = item_id;
        record.repetitions = repetitions;
        record.next_review_date = day(next);
        store.insert_new(&record).unwrap();
    }
    let service = SchedulingService::new(store, catalog(), SchedulerConfig::graded());

    let stats = service.get_stats(7, day("2026-08-30")).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.due, 2);
    assert_eq!(stats.learning, 2);
    assert_eq!(stats.mastered, 2);
}

#[test]
fn failed_card_defers_to_tomorrow_by_default() {
    let service = flashcard_service(SchedulerConfig::graded());
    let today = day("2026-08-30");

    service.track_item_at(7, 1, today).unwrap();
    service
        .register_success_at(7, 1, ReviewSignal::Quality(1), today)
        .unwrap();

    assert_eq!(service.get_due(7, today).unwrap().count, 0);
    assert_eq!(service.get_due(7, day("2026-08-31")).unwrap().count, 1);
}

#[test]
fn failed_card_can_stay_due_today_when_configured() {
    let mut config = SchedulerConfig::graded();
    config.min_interval_on_failure = 0;
    let service = flashcard_service(config);
    let today = day("2026-08-30");

    service.track_item_at(7, 1, today).unwrap();
    service
        .register_success_at(7, 1, ReviewSignal::Quality(1), today)
        .unwrap();

    assert_eq!(service.get_due(7, today).unwrap().count, 1);
}

#[test]
fn drill_signals_are_rejected_on_the_graded_track() {
    let service = flashcard_service(SchedulerConfig::graded());
    let today = day("2026-08-30");
    service.track_item_at(7, 1, today).unwrap();

    assert!(matches!(
        service.register_success_at(7, 1, ReviewSignal::Remembered, today),
        Err(SchedulerError::Validation(_))
    ));
}

#[test]
fn remove_drops_the_record_once() {
    let service = drill_service();
    let today = day("2026-08-30");

    service.register_failure_at(7, 1, today).unwrap();
    service.remove(7, 1).unwrap();
    assert!(matches!(
        service.remove(7, 1),
        Err(SchedulerError::NotFound { user_id: 7, item_id: 1 })
    ));
    assert_eq!(service.get_stats(7, today).unwrap().total, 0);
}
