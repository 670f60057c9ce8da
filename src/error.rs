use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    /// Model declaration cannot be turned into a table (not a record, no primary key)
    #[error("descriptor error: {0}")]
    Descriptor(String),

    /// Relationship declaration is malformed
    #[error("relation error: {0}")]
    Relation(String),

    /// Any failure reported by the underlying store
    #[error("storage error: {0}")]
    Storage(String),

    /// Request payload references data unknown to storage
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),
}

impl BlogError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Prefix the message while keeping the variant
    pub fn context(self, prefix: impl std::fmt::Display) -> Self {
        let wrap = |message: String| format!("{}: {}", prefix, message);
        match self {
            Self::Descriptor(m) => Self::Descriptor(wrap(m)),
            Self::Relation(m) => Self::Relation(wrap(m)),
            Self::Storage(m) => Self::Storage(wrap(m)),
            Self::Validation(m) => Self::Validation(wrap(m)),
            Self::NotFound(m) => Self::NotFound(wrap(m)),
            Self::Conflict(m) => Self::Conflict(wrap(m)),
        }
    }
}

impl From<sqlx::Error> for BlogError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => BlogError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                BlogError::Conflict(db_err.message().to_string())
            }
            other => BlogError::Storage(other.to_string()),
        }
    }
}
