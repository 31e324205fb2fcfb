//! Unified error handling for the trackmap library.
//!
//! Only two things are ever reported as errors: a document that is not
//! well-formed XML, and a configuration that cannot be used. Everything else
//! (a corrupt point, a missing attribute, an unparseable timestamp) is skipped
//! by the readers without surfacing an error.

use std::fmt;

/// Unified error type for trackmap operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackMapError {
    /// The input document is not well-formed XML
    Parse {
        /// Identifies the offending document (file name, storage key, post slug)
        source: String,
        message: String,
    },
    /// Configuration error, raised before any parsing begins
    Config { message: String },
}

impl TrackMapError {
    /// Build a parse error for the named document.
    pub fn parse(source: &str, message: impl fmt::Display) -> Self {
        TrackMapError::Parse {
            source: source.to_string(),
            message: message.to_string(),
        }
    }

    /// Build a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        TrackMapError::Config {
            message: message.to_string(),
        }
    }
}

impl fmt::Display for TrackMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackMapError::Parse { source, message } => {
                write!(f, "Document '{}' could not be parsed: {}", source, message)
            }
            TrackMapError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for TrackMapError {}

/// Result type alias for trackmap operations.
pub type Result<T> = std::result::Result<T, TrackMapError>;
