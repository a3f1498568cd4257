//! Directory error types
//!
//! Validation failures raised before any network call, and transport
//! failures surfaced unchanged from the directory connection.

use thiserror::Error;

/// Error that can occur while working with directory entries.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Raised locally, before any call into the connection
    /// The entry is not in a state that allows the operation.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Configuration is missing or contradictory.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A value could not be decoded into the expected shape.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    // Transport errors, produced by the connection collaborator
    /// Failed to reach or talk to the directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected the supplied credentials.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// The bound identity may not perform the operation.
    #[error("authorization failed: insufficient access for {operation}")]
    AuthorizationFailed { operation: String },

    /// The target entry does not exist.
    #[error("object not found: {dn}")]
    ObjectNotFound { dn: String },

    /// An entry with the same DN already exists.
    #[error("object already exists: {dn}")]
    ObjectAlreadyExists { dn: String },

    /// The server refused the values (schema or policy constraint).
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Any other failed directory operation.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DirectoryError {
    /// Check if this error was raised locally before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, DirectoryError::Validation { .. })
    }

    /// Check if this error came from the connection collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. }
                | DirectoryError::AuthenticationFailed
                | DirectoryError::AuthorizationFailed { .. }
                | DirectoryError::ObjectNotFound { .. }
                | DirectoryError::ObjectAlreadyExists { .. }
                | DirectoryError::ConstraintViolation { .. }
                | DirectoryError::OperationFailed { .. }
        )
    }

    /// Check if retrying the same call could succeed.
    ///
    /// Nothing in this crate retries; the classification is for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::ConnectionFailed { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::Validation { .. } => "VALIDATION",
            DirectoryError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            DirectoryError::InvalidData { .. } => "INVALID_DATA",
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::AuthenticationFailed => "AUTH_FAILED",
            DirectoryError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            DirectoryError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            DirectoryError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            DirectoryError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            DirectoryError::OperationFailed { .. } => "OPERATION_FAILED",
        }
    }

    // Convenience constructors

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        DirectoryError::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        DirectoryError::InvalidData {
            message: message.into(),
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_not_transport() {
        let err = DirectoryError::validation("entry does not exist");
        assert!(err.is_validation());
        assert!(!err.is_transport());
        assert!(!err.is_transient());
        assert_eq!(err.error_code(), "VALIDATION");
    }

    #[test]
    fn test_transport_errors() {
        let transport_errors = vec![
            DirectoryError::connection_failed("test"),
            DirectoryError::AuthenticationFailed,
            DirectoryError::ObjectNotFound {
                dn: "cn=missing".to_string(),
            },
            DirectoryError::ObjectAlreadyExists {
                dn: "cn=dup".to_string(),
            },
            DirectoryError::operation_failed("test"),
        ];

        for err in transport_errors {
            assert!(
                err.is_transport(),
                "Expected {} to be a transport error",
                err.error_code()
            );
            assert!(!err.is_validation());
        }
    }

    #[test]
    fn test_only_connection_failures_are_transient() {
        assert!(DirectoryError::connection_failed("down").is_transient());
        assert!(!DirectoryError::AuthenticationFailed.is_transient());
        assert!(!DirectoryError::operation_failed("rc 53").is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::ObjectNotFound {
            dn: "cn=John,dc=corp,dc=org".to_string(),
        };
        assert_eq!(err.to_string(), "object not found: cn=John,dc=corp,dc=org");

        let err = DirectoryError::AuthorizationFailed {
            operation: "delete".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authorization failed: insufficient access for delete"
        );
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "reset by peer");
        let err = DirectoryError::connection_failed_with_source("failed", source_err);

        if let DirectoryError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}
