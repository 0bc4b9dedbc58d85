//! Core error types for gradebench
//!
//! Provider faults carry their own classification (see [`crate::llm::ProviderError`])
//! and stay inside the session; everything else funnels into [`HarnessError`].

use thiserror::Error;

/// Result type alias for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Main error type for the harness
#[derive(Error, Debug, Clone)]
pub enum HarnessError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Interpreter / code runtime errors
    #[error("Runtime error: {message}")]
    Runtime {
        message: String,
        program: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },
}

impl HarnessError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a runtime error naming the program that failed
    pub fn runtime_with_program(message: impl Into<String>, program: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            program: Some(program.into()),
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "GB_CONFIG",
            Self::Runtime { .. } => "GB_RUNTIME",
            Self::Io { .. } => "GB_IO",
            Self::Json { .. } => "GB_JSON",
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            context: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(HarnessError::config("bad").error_code(), "GB_CONFIG");
        assert_eq!(
            HarnessError::runtime_with_program("boom", "python3").error_code(),
            "GB_RUNTIME"
        );
        let io: HarnessError = std::io::Error::other("disk").into();
        assert_eq!(io.error_code(), "GB_IO");
        let json: HarnessError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert_eq!(json.error_code(), "GB_JSON");
    }

    #[test]
    fn test_display_includes_message() {
        let err = HarnessError::runtime_with_program("not found", "python3");
        assert_eq!(err.to_string(), "Runtime error: not found");
    }
}
