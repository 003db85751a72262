use thiserror::Error;

/// Why a line could not be turned into a reading. Carries the trimmed line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected response from scale: '{0}'")]
    UnexpectedResponse(String),
    #[error("invalid number format from scale: '{0}'")]
    InvalidNumber(String),
}

impl DecodeError {
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::UnexpectedResponse(_) => "unexpected response",
            DecodeError::InvalidNumber(_) => "invalid number format",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DecodeError::UnexpectedResponse(t) | DecodeError::InvalidNumber(t) => t,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("no response from scale within {0} ms")]
    ResponseTimeout(u64),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("transport reached end of input")]
    EndOfInput,
    #[error("session closed")]
    Closed,
    #[error("{0} is not supported by this scale dialect")]
    Unsupported(&'static str),
}

impl SessionError {
    /// Transport-level failures end the session; everything else is per-line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Transport(_) | SessionError::EndOfInput)
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transport")]
    MissingTransport,
    #[error("missing event sink")]
    MissingSink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("failed to open transport: {0}")]
    Open(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
