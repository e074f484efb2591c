use std::error::Error;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the blocking read side of a body stream.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("stream closed")]
    Closed,

    #[error("await client data stream timeout, timeout = {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("decode body error: {source}")]
    Decode {
        #[from]
        source: DecodeError,
    },

    #[error("interrupted while awaiting body data")]
    Interrupted,

    #[error("read listener error: {source}")]
    Listener { source: Box<dyn Error + Send + Sync> },
}

impl BodyError {
    pub fn read_timeout(timeout: Duration) -> Self {
        Self::ReadTimeout { timeout }
    }

    pub fn listener<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Listener { source: e.into() }
    }

    /// Returns true if the owning connection must be torn down after this error
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(self, Self::ReadTimeout { .. } | Self::Decode { .. })
    }
}

impl From<BodyError> for io::Error {
    fn from(e: BodyError) -> Self {
        let kind = match &e {
            BodyError::Closed => io::ErrorKind::BrokenPipe,
            BodyError::ReadTimeout { .. } => io::ErrorKind::TimedOut,
            BodyError::Decode { .. } => io::ErrorKind::InvalidData,
            // not `ErrorKind::Interrupted`, std readers retry on that kind
            BodyError::Interrupted | BodyError::Listener { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

/// Malformed body content reported by a decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    pub fn new<S: ToString>(reason: S) -> Self {
        Self { reason: reason.to_string() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures of the transport while it streams payload items.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
