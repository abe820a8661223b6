use thiserror::Error;

/// Errors surfaced by the chat and message services.
///
/// The transport layer maps each variant to a distinct status; see
/// `parley-api::http::error`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied input violates a constraint.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced chat or message does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A chat with the same title already exists.
    #[error("{0}")]
    Conflict(String),

    /// Any persistence failure not classified above.
    #[error("{context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    /// Wrap a repository failure with a short description of the step that failed.
    pub fn persistence(context: impl Into<String>, source: RepositoryError) -> Self {
        ServiceError::Persistence {
            context: context.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }
}

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
