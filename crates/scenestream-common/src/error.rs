//! Common error types used throughout scenestream.
//!
//! Stream resolution distinguishes three caller-visible failure kinds:
//! missing records ([`Error::NotFound`]), malformed identity data
//! ([`Error::InvalidInput`]) and a malformed transcode policy
//! ([`Error::Configuration`]). The remaining variants cover infrastructure
//! around the engine.

/// Common error type for scenestream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested scene or file was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A malformed identifier or a structurally missing required field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The transcode policy or other configuration is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A collaborator needed to serve the request is not available.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Unavailable error.
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code the transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Configuration(_) | Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Configuration(_) => "configuration_error",
            Self::Database(_) => "database_error",
            Self::Io(_) => "io_error",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("scene 7");
        assert_eq!(err.to_string(), "Not found: scene 7");

        let err = Error::invalid_input("bad id");
        assert_eq!(err.to_string(), "Invalid input: bad id");

        let err = Error::configuration("max_width must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: max_width must be positive"
        );

        let err = Error::unavailable("no executor");
        assert_eq!(err.to_string(), "Unavailable: no executor");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::not_found("x").http_status(), 404);
        assert_eq!(Error::invalid_input("x").http_status(), 400);
        assert_eq!(Error::configuration("x").http_status(), 500);
        assert_eq!(Error::database("x").http_status(), 500);
        assert_eq!(Error::unavailable("x").http_status(), 503);
        assert_eq!(Error::internal("x").http_status(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::not_found("x").code(), "not_found");
        assert_eq!(Error::invalid_input("x").code(), "invalid_input");
        assert_eq!(Error::configuration("x").code(), "configuration_error");
    }
}
