//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The balance sheet pipeline itself never fails on data problems; these
/// errors cover everything around it (configuration, input files, rule tables).
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Input or output file could not be accessed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry file is not a valid list of ledger entries.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Classification rule tables are inconsistent.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidRules(_) => 78,
            Self::Io(_) => 74,
            Self::InvalidInput(_) => 65,
            Self::Internal(_) => 70,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidRules(_) => "INVALID_RULES",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(AppError::InvalidInput(String::new()).exit_code(), 65);
        assert_eq!(AppError::InvalidRules(String::new()).exit_code(), 78);
        assert_eq!(AppError::Internal(String::new()).exit_code(), 70);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(AppError::from(io).exit_code(), 74);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidInput(String::new()).error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            AppError::InvalidRules(String::new()).error_code(),
            "INVALID_RULES"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", AppError::InvalidInput("msg".into())),
            "Invalid input: msg"
        );
        assert_eq!(
            format!("{}", AppError::InvalidRules("msg".into())),
            "Invalid rules: msg"
        );
        assert_eq!(
            format!("{}", AppError::Internal("msg".into())),
            "Internal error: msg"
        );
    }
}
