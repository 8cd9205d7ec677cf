//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // REST/API Errors
    // ─────────────────────────────────────────────────────────────
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ─────────────────────────────────────────────────────────────
    // Real-time Transport Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Session Store Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Session store error: {message}")]
    Store { message: String },

    #[error("No active session")]
    NoSession,

    // ─────────────────────────────────────────────────────────────
    // Push Messaging Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Push gateway error: {message}")]
    PushGateway { message: String },

    #[error("Push permission denied by the user")]
    PushPermissionDenied,

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid field '{field}': {message}")]
    Validation { field: String, message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn push_gateway(message: impl Into<String>) -> Self {
        Self::PushGateway {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable failures degrade to a status indicator and an optional
    /// manual retry; they never terminate the engine.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Http { .. }
                | Error::Api { .. }
                | Error::Auth { .. }
                | Error::Transport { .. }
                | Error::ChannelClosed
                | Error::Store { .. }
                | Error::NoSession
                | Error::PushGateway { .. }
                | Error::PushPermissionDenied
                | Error::Validation { .. }
        )
    }

    /// Check if this error should abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ConfigNotFound { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = Error::http(404, "device not found");
        assert_eq!(err.to_string(), "HTTP error 404: device not found");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::transport("socket hung up").is_recoverable());
        assert!(Error::http(500, "server error").is_recoverable());
        assert!(Error::PushPermissionDenied.is_recoverable());
        assert!(!Error::ConfigNotFound {
            path: PathBuf::from("/etc/homewatch.toml")
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::ConfigNotFound {
            path: PathBuf::from("/test")
        }
        .is_fatal());
        assert!(!Error::transport("test").is_fatal());
        assert!(!Error::validation("phone", "must be 10 digits").is_fatal());
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let err = Error::validation("phone", "must be exactly 10 digits");
        assert!(err.to_string().contains("phone"));
        assert!(err.to_string().contains("10 digits"));
    }
}
