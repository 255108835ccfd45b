//! Application error type.
//!
//! Every fallible function in the crate returns `Result<_, AppError>`. The
//! [`ErrorKind`] decides the process exit code; the message is what the user
//! sees on stderr.

/// Failure categories surfaced by the loader, the normalizer and the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied parameter or configuration value is out of range.
    InvalidParameters,
    /// A local input file does not exist.
    MissingFile,
    /// A local input could not be parsed into `(date, positive value)` rows.
    MalformedData,
    /// The remote provider was unreachable or returned no rows.
    DataUnavailable,
    /// A recession's peak-search interval contains no observations.
    NoObservationsInWindow,
    /// Writing an export or cache file failed.
    Io,
    /// Chart or terminal rendering failed.
    Render,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidParameters | ErrorKind::MissingFile => 2,
            ErrorKind::MalformedData | ErrorKind::NoObservationsInWindow => 3,
            ErrorKind::DataUnavailable | ErrorKind::Io | ErrorKind::Render => 4,
        }
    }
}

#[derive(Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::new(ErrorKind::InvalidParameters, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::MissingFile, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::MalformedData, "x").exit_code(), 3);
        assert_eq!(AppError::new(ErrorKind::DataUnavailable, "x").exit_code(), 4);
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::new(ErrorKind::Io, "Failed to write export CSV");
        assert_eq!(err.to_string(), "Failed to write export CSV");
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
