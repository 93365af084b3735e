//! Shared error types for the analysis engine

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input is not valid Python. Fatal for the request; no report is produced.
    #[error("SyntaxError: {message} (line {line}, column {column})")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A recognized construct the engine does not model. Recovered locally.
    #[error("UnsupportedConstruct: {construct} at line {line}")]
    UnsupportedConstruct { construct: String, line: usize },

    /// An input exceeded a configured cap. The affected component is skipped.
    #[error("ResourceLimitExceeded: {component} skipped: input too large ({detail})")]
    ResourceLimitExceeded {
        component: &'static str,
        detail: String,
    },

    /// The Python grammar could not be loaded into the parser
    #[error("Parser error: {0}")]
    Parser(String),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a syntax error with location
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn unsupported(construct: impl Into<String>, line: usize) -> Self {
        Self::UnsupportedConstruct {
            construct: construct.into(),
            line,
        }
    }

    pub fn resource_limit(component: &'static str, detail: impl Into<String>) -> Self {
        Self::ResourceLimitExceeded {
            component,
            detail: detail.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            path: None,
        }
    }

    /// Short, stable name of the error kind as exposed at the boundary
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "SyntaxError",
            Self::UnsupportedConstruct { .. } => "UnsupportedConstruct",
            Self::ResourceLimitExceeded { .. } => "ResourceLimitExceeded",
            Self::Parser(_) => "ParserError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Io(_) => "IoError",
        }
    }

    /// Whether the request can continue with this error recorded as a notice
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedConstruct { .. } | Self::ResourceLimitExceeded { .. }
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
