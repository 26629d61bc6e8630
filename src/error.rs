use diesel::result::Error as DieselError;
use thiserror::Error;

/// Opaque failure surfaced from a persistence collaborator. The scheduler
/// never interprets or retries these.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors produced by the scheduling engine.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("no schedule record for user {user_id}, item {item_id}")]
    NotFound { user_id: i32, item_id: i32 },
    #[error("vocabulary item {0} does not exist")]
    ItemNotFound(i32),
    #[error(transparent)]
    Store(#[from] StoreError),
}
