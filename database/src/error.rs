use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Game not found: {0}")]
    GameNotFound(i64),

    #[error("Retry exhausted: {0}")]
    RetryExhausted(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(e.to_string())
            }
            other => DatabaseError::Query(other.to_string()),
        }
    }
}
