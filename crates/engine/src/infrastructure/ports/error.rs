//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A write would have broken a graph invariant and was rolled back.
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Create a ConsistencyViolation error.
    pub fn consistency(message: impl ToString) -> Self {
        Self::ConsistencyViolation(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure talking to a narrative collaborator service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    /// Transport failure: connection refused, timeout, DNS.
    #[error("{service} unreachable: {message}")]
    Unreachable {
        service: &'static str,
        message: String,
    },

    /// Non-success HTTP status, with the upstream `detail`/`message` when present.
    #[error("{service} returned {status}: {detail}")]
    Status {
        service: &'static str,
        status: u16,
        detail: String,
    },

    /// Body could not be decoded or failed validation.
    #[error("{service} sent an invalid response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    pub fn service(&self) -> &'static str {
        match self {
            Self::Unreachable { service, .. }
            | Self::Status { service, .. }
            | Self::InvalidResponse { service, .. } => service,
        }
    }
}
