//! Engine error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types organized by domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Pattern Construction Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid expression `{expression}`: {message}")]
    InvalidExpression { expression: String, message: String },

    #[error("Invalid style: {message}")]
    InvalidStyle { message: String },

    // ─────────────────────────────────────────────────────────────
    // Pattern Set Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed pattern definitions: {message}")]
    Schema { message: String },

    #[error("Parse error at pattern `{name}`: {message}")]
    Parse { name: String, message: String },

    #[error("No pattern with id `{id}`")]
    NotFound { id: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Block index {index} out of range ({count} blocks)")]
    BlockOutOfRange { index: usize, count: usize },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    pub fn invalid_style(message: impl Into<String>) -> Self {
        Self::InvalidStyle {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a [`Error::Parse`] naming the offending pattern entry
    pub fn parse(name: impl Into<String>, cause: &Error) -> Self {
        Self::Parse {
            name: name.into(),
            message: cause.to_string(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Check if this error means the backing definitions are unusable
    /// (file absent or structurally corrupt) as opposed to a typo in a
    /// single entry
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema { .. } | Error::ConfigNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::invalid_expression("[bad", "unclosed character class");
        assert_eq!(
            err.to_string(),
            "Invalid expression `[bad`: unclosed character class"
        );

        let err = Error::not_found("7");
        assert_eq!(err.to_string(), "No pattern with id `7`");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parse_error_names_entry() {
        let cause = Error::invalid_expression("(", "unclosed group");
        let err = Error::parse("App start", &cause);
        assert!(err.to_string().contains("App start"));
        assert!(err.to_string().contains("unclosed group"));
    }

    #[test]
    fn test_schema_vs_parse_distinction() {
        assert!(Error::schema("missing field `needed`").is_schema());
        let cause = Error::invalid_style("two colors");
        assert!(!Error::parse("x", &cause).is_schema());
    }
}
