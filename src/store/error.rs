use thiserror::Error;

/// Failure inside a store transaction
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The progress row changed between load and write
    #[error("progress for user '{user_id}' changed concurrently (expected version {expected})")]
    Conflict { user_id: String, expected: u64 },
}

impl StoreError {
    /// Both variants leave the database untouched, so the caller may retry
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Conflict { .. } => true,
            StoreError::Sqlite(err) => !matches!(
                err,
                rusqlite::Error::InvalidParameterName(_)
                    | rusqlite::Error::InvalidColumnName(_)
                    | rusqlite::Error::InvalidColumnType(..)
            ),
        }
    }
}
