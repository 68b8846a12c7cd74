//! Purpose: Define the single error type shared by every pipeline stage.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Carries kind, context, and source chain from the failing stage to `main`.
//! Invariants: Every fatal condition maps to exactly one `ErrorKind`.
//! Invariants: Exit codes are stable; fatal runtime kinds all exit with 1.
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The log sink could not be configured (log file open failure).
    Config,
    /// Reading stdin or writing stdout failed.
    Io,
    /// Input was not a JSON object of the request shape.
    Decode,
    /// The response could not be serialized.
    Encode,
    /// Command-line arguments were rejected.
    Usage,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<PathBuf>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Config
        | ErrorKind::Io
        | ErrorKind::Decode
        | ErrorKind::Encode
        | ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Config, 1),
            (ErrorKind::Io, 1),
            (ErrorKind::Decode, 1),
            (ErrorKind::Encode, 1),
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_context_and_source() {
        let err = Error::new(ErrorKind::Config)
            .with_message("failed to open log file")
            .with_path("/nope/proc1.log")
            .with_source(io::Error::new(io::ErrorKind::NotFound, "no such dir"));

        let text = err.to_string();
        assert!(text.starts_with("Config: failed to open log file"));
        assert!(text.contains("(path: /nope/proc1.log)"));
        assert!(text.ends_with("no such dir"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no such dir"));
    }
}
