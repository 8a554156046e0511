//! Credential service error types.
//!
//! Errors here are hard failures: the operation could not produce a result.
//! Policy violations are not errors in this sense, they are returned as part
//! of [`ValidationOutcome`], and malformed stored credentials are folded into
//! a `false` verification result.
//!
//! [`ValidationOutcome`]: crate::policy::ValidationOutcome

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for credential operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing credential service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied an input the operation cannot accept.
    ///
    /// Not retryable with the same input.
    InvalidInput,
    /// The operating system could not provide entropy.
    RandomSource,
    /// Invalid configuration values or an unreadable denylist source.
    Config,
    /// Failure inside the hash primitive or the worker pool.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Credential service error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{} error: {message}", .kind.as_str())]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a new random source error.
    #[inline]
    pub fn random_source(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::RandomSource, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new internal error attributed to a component.
    #[inline]
    pub fn internal(
        component: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let component = component.into();
        let message = message.into();
        Self::new(ErrorKind::Internal, format!("{component}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::invalid_input("secret required");
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(error.message(), "secret required");
        assert_eq!(error.to_string(), "invalid_input error: secret required");
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::config("cannot read denylist").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_internal_error_names_component() {
        let error = Error::internal("argon2", "invalid parameters");

        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(error.to_string().contains("argon2"));
        assert!(error.to_string().contains("invalid parameters"));
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::InvalidInput.as_str(), "invalid_input");
        assert_eq!(ErrorKind::RandomSource.as_str(), "random_source");
        assert_eq!(ErrorKind::Config.as_str(), "config");
        assert_eq!(ErrorKind::Internal.as_str(), "internal");
    }
}
