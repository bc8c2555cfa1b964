//! Error handling for resolver probing operations.
//!
//! This module defines the error type shared by the whole library. Errors
//! fall into two groups: per-candidate probe failures, which are contained
//! inside a single probe task, and run-level failures (candidate source,
//! configuration, sink) that abort the run.

use std::fmt;
use std::time::Duration;

/// Main error type for resolver checking operations.
#[derive(Debug, Clone)]
pub enum DnsCheckError {
    /// The candidate address could not be turned into a socket address
    InvalidCandidate { server: String, reason: String },

    /// The UDP connect to `server:port` failed
    ConnectFailed { server: String, message: String },

    /// The target hostname did not resolve
    ResolveFailed { hostname: String, message: String },

    /// Network-related errors (connection, TLS, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// The candidate list could not be fetched
    SourceError { source: String, message: String },

    /// File I/O errors when reading candidate lists or config files
    FileError { path: String, message: String },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Writing a result to the output sink failed
    SinkError { target: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DnsCheckError {
    /// Create a new invalid candidate error.
    pub fn invalid_candidate<S: Into<String>, R: Into<String>>(server: S, reason: R) -> Self {
        Self::InvalidCandidate {
            server: server.into(),
            reason: reason.into(),
        }
    }

    /// Create a new connect failure.
    pub fn connect<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::ConnectFailed {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new resolution failure.
    pub fn resolve<H: Into<String>, M: Into<String>>(hostname: H, message: M) -> Self {
        Self::ResolveFailed {
            hostname: hostname.into(),
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new candidate source error.
    pub fn source_error<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self::SourceError {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new sink error.
    pub fn sink<T: Into<String>, M: Into<String>>(target: T, message: M) -> Self {
        Self::SinkError {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// Candidate source, file, configuration and sink errors are fatal.
    /// Everything a single probe can produce only excludes that candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceError { .. }
                | Self::FileError { .. }
                | Self::ConfigError { .. }
                | Self::SinkError { .. }
                | Self::Internal { .. }
        )
    }

    /// Whether this error came out of a single candidate's probe.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCandidate { .. }
                | Self::ConnectFailed { .. }
                | Self::ResolveFailed { .. }
                | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for DnsCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCandidate { server, reason } => {
                write!(f, "Invalid candidate '{}': {}", server, reason)
            }
            Self::ConnectFailed { server, message } => {
                write!(f, "Cannot connect to '{}': {}", server, message)
            }
            Self::ResolveFailed { hostname, message } => {
                write!(f, "Cannot resolve '{}': {}", hostname, message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::SourceError { source, message } => {
                write!(f, "Failed to load resolver list from {}: {}", source, message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::SinkError { target, message } => {
                write!(f, "Failed to write results to {}: {}", target, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DnsCheckError {}

impl From<reqwest::Error> for DnsCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("HTTP request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if let Some(status) = err.status() {
            Self::network(format!("HTTP status {}", status))
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<toml::de::Error> for DnsCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
