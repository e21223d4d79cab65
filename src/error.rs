//! Error types for the paulstretch crate.

use std::fmt;

/// Errors that can occur while loading, stretching or writing audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StretchError {
    /// Source file missing or unreadable.
    InputLoad(String),
    /// Bytes are not a supported RIFF/WAVE PCM container.
    InvalidFormat(String),
    /// Caller-supplied parameter out of range.
    InvalidParameter(String),
    /// I/O error while writing output.
    Io(String),
}

impl fmt::Display for StretchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StretchError::InputLoad(msg) => write!(f, "failed to load input: {}", msg),
            StretchError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            StretchError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            StretchError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StretchError {}

impl From<std::io::Error> for StretchError {
    fn from(err: std::io::Error) -> Self {
        StretchError::Io(err.to_string())
    }
}

impl StretchError {
    /// True for errors raised while reading or decoding the source.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            StretchError::InputLoad(_) | StretchError::InvalidFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = StretchError::InvalidParameter("stretch must be positive".to_string());
        assert!(err.to_string().contains("stretch must be positive"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StretchError = io.into();
        assert!(matches!(err, StretchError::Io(_)));
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_load_error_kinds() {
        assert!(StretchError::InputLoad("x".into()).is_load_error());
        assert!(StretchError::InvalidFormat("x".into()).is_load_error());
        assert!(!StretchError::InvalidParameter("x".into()).is_load_error());
    }
}
