//! Error types for pool operations
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pool construction, acquisition and release
#[derive(Error, Debug)]
pub enum Error {
    /// Pool configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
    },

    /// No resource became available within the acquire timeout
    #[error("Timed out after {timeout_ms}ms waiting for a '{resource_id}' resource")]
    Timeout {
        /// The factory identifier
        resource_id: String,
        /// The timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The factory failed to create a resource
    #[error("Factory for '{resource_id}' failed to create a resource: {reason}")]
    Factory {
        /// The factory identifier
        resource_id: String,
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The released handle does not belong to this pool
    #[error("Resource is not checked out from the '{resource_id}' pool")]
    InvalidResource {
        /// The factory identifier
        resource_id: String,
    },

    /// The pool has been closed
    #[error("Pool '{resource_id}' is closed")]
    ClosedPool {
        /// The factory identifier
        resource_id: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a factory error without an underlying cause
    pub fn factory<I: Into<String>, S: Into<String>>(resource_id: I, reason: S) -> Self {
        Self::Factory {
            resource_id: resource_id.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a factory error wrapping the backend's own error
    pub fn factory_with_source<I, E>(resource_id: I, source: E) -> Self
    where
        I: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Factory {
            resource_id: resource_id.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn timeout(resource_id: &str, timeout: std::time::Duration) -> Self {
        Self::Timeout {
            resource_id: resource_id.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub(crate) fn closed(resource_id: &str) -> Self {
        Self::ClosedPool {
            resource_id: resource_id.to_string(),
        }
    }

    pub(crate) fn invalid_resource(resource_id: &str) -> Self {
        Self::InvalidResource {
            resource_id: resource_id.to_string(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Factory { .. })
    }

    /// Get the factory identifier associated with this error (if any)
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Configuration { .. } => None,
            Self::Timeout { resource_id, .. }
            | Self::Factory { resource_id, .. }
            | Self::InvalidResource { resource_id }
            | Self::ClosedPool { resource_id } => Some(resource_id),
        }
    }
}
