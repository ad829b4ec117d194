//! Error types for s3sign-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for s3sign-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3sign-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed bucket path, object key or local path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Semantically invalid command-line arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A local file or directory could not be accessed
    #[error("Cannot access {}: {source}", path.display())]
    LocalPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or service error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an IO error with the local path it concerns
    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalPath {
            path: path.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::InvalidArgument(_) => 2, // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,          // UsageError
            Error::Network(_) => 3,                                // NetworkError
            Error::Auth(_) => 4,                                   // AuthError
            Error::NotFound(_) => 5,                               // NotFound
            _ => 1,                                                // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::InvalidArgument("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::General("test".into()).exit_code(), 1);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::local("/tmp/x", io).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidPath("/bad/path".into());
        assert_eq!(err.to_string(), "Invalid path: /bad/path");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::local("data/missing", io);
        assert_eq!(err.to_string(), "Cannot access data/missing: no such file");
    }
}
