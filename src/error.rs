use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Unified error type for the resolver library surface.
///
/// Marker validity problems are *diagnostics*, not errors; this type covers the
/// programmatic failures a host compiler can trigger by handing the crate
/// inconsistent inputs (e.g. binding an argument list that overload resolution
/// should never have produced) plus metadata and I/O plumbing.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Metadata(serde_json::Error),
    Bind {
        message: String,
        backtrace: Option<Backtrace>,
    },
    Internal {
        message: String,
        backtrace: Option<Backtrace>,
    },
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a new call-site binding error.
    pub fn bind(message: impl Into<String>) -> Self {
        Self::Bind {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Construct a new internal invariant-violation error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Return the captured backtrace, if any.
    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Error::Bind { backtrace, .. } | Error::Internal { backtrace, .. } => backtrace.as_ref(),
            _ => None,
        }
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    if cfg!(debug_assertions) {
        Some(Backtrace::force_capture())
    } else {
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Metadata(err) => write!(f, "metadata error: {err}"),
            Error::Bind { message, .. } => write!(f, "bind error: {message}"),
            Error::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Metadata(err) => Some(err),
            Error::Bind { .. } | Error::Internal { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Metadata(error)
    }
}
