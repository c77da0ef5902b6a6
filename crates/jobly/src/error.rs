//! Error types for jobly

use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Error types for data-layer operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Caller supplied insufficient or invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The targeted row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Natural-key collision on create
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// A statement that must return a row returned none
    #[error("Expected one row, got none: {0}")]
    MissingRow(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl JoblyError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a duplicate error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a bad request error
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a duplicate error
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// HTTP status code a routing layer should answer with.
    ///
    /// Duplicates are reported as 400, like any other unacceptable payload.
    /// Everything that is not a caller error is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Duplicate(_) => 400,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        assert_eq!(JoblyError::bad_request("No data").status_code(), 400);
        assert_eq!(JoblyError::duplicate("Duplicate company: c1").status_code(), 400);
        assert_eq!(JoblyError::not_found("No company: nope").status_code(), 404);
    }

    #[test]
    fn everything_else_is_a_server_fault() {
        assert_eq!(JoblyError::decode("handle", "bad type").status_code(), 500);
        assert_eq!(JoblyError::config("missing url").status_code(), 500);
        assert_eq!(JoblyError::MissingRow("INSERT".into()).status_code(), 500);
        assert_eq!(
            JoblyError::UniqueViolation("companies_pkey: dup".into()).status_code(),
            500
        );
    }

    #[test]
    fn display_includes_message() {
        let err = JoblyError::not_found("No job with id: 7");
        assert_eq!(err.to_string(), "Not found: No job with id: 7");
        assert!(err.is_not_found());
        assert!(!err.is_bad_request());
    }
}
