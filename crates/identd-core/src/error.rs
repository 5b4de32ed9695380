//! Error types for identd-core.

use thiserror::Error;

/// Main error type for identd operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listener could not bind its configured address.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed ident request line.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Reading the request line exceeded the configured idle timeout.
    #[error("read timed out")]
    ReadTimeout,
}

impl Error {
    /// Returns true if this error leaves the listener in the sticky
    /// "bind failed" state.
    ///
    /// Every other failure is local to one query; only a bind failure
    /// persists until the next registration attempt.
    pub fn is_bind_failure(&self) -> bool {
        matches!(self, Error::Bind { .. })
    }
}

/// Convenience result type for identd operations.
pub type Result<T> = std::result::Result<T, Error>;
