//! Errors from loading a [`Config`](crate::Config).
//!
//! Malformed commit messages are never errors; they produce
//! [`Diagnostic`](crate::Diagnostic)s.

use std::fmt;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// The error returned when a configuration cannot be loaded.
pub struct Error {
    kind: ErrorKind,
    context: Option<Box<dyn fmt::Display + Send + Sync>>,
    source: Option<BoxedError>,
}

impl Error {
    /// Create a new error from a `ErrorKind`.
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            source: None,
        }
    }

    pub(crate) fn set_context(mut self, context: Box<dyn fmt::Display + Send + Sync>) -> Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn set_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("context", &self.context.as_ref().map(|c| c.to_string()))
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(context) = self.context.as_ref() {
            write!(f, ": {context}")?;
        }
        if let Some(source) = self.source.as_ref() {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// All possible error kinds returned when loading a configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The configuration file could not be read.
    Io,

    /// The configuration is not valid JSON or has unexpected keys.
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io => f.write_str("failed to read configuration"),
            ErrorKind::InvalidConfig => f.write_str("invalid configuration"),
        }
    }
}
