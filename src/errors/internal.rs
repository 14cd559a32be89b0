use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {operation} failed: {source}")]
    Operation {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Starting transaction failed: {source}")]
    TransactionBegin {
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Committing transaction failed: {source}")]
    TransactionCommit {
        #[source]
        source: sea_orm::DbErr,
    },
}

/// Store-level error. Handlers convert this to an API response via
/// `From<DomainError> for ApiError`; database detail stays internal.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Referenced record does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Malformed or incomplete input.
    #[error("{0}")]
    Validation(String),

    /// A business invariant rejected the write. The message is shown
    /// to the client verbatim.
    #[error("{0}")]
    Conflict(String),

    /// Non-database infrastructure failure (hashing, filesystem)
    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        DomainError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn not_found(entity: &'static str) -> Self {
        DomainError::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal(message.into())
    }
}
