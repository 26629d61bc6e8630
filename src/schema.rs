diesel::table! {
    schedule_records (user_id, item_id, track) {
        user_id -> Integer,
        item_id -> Integer,
        track -> Integer,
        ease_factor -> Double,
        interval_days -> Integer,
        repetitions -> Integer,
        next_review_date -> Date,
        last_reviewed_date -> Nullable<Date>,
        times_forgotten -> Integer,
    }
}

diesel::table! {
    vocabulary_items (item_id) {
        item_id -> Integer,
        word -> Text,
        phonetic -> Text,
        definition -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(schedule_records, vocabulary_items,);
