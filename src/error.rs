//! Rich diagnostic error types for sentiment-lens.
//!
//! Report extraction itself never fails. Errors come from the collaborators
//! around it (the backend client, the history store, configuration), and
//! each of them defines its own enum with miette `#[diagnostic]` derives so
//! users get an error code and a hint about what to do next.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LensError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Value(#[from] UnknownVariant),

    #[error("cannot read report from {origin}: {source}")]
    #[diagnostic(
        code(lens::input::read),
        help("Pass a readable report file, or pipe the report text or result JSON on stdin.")
    )]
    Input {
        origin: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    #[error("cannot reach the analysis backend at {url}: {message}")]
    #[diagnostic(
        code(lens::client::unreachable),
        help(
            "Make sure the backend is running (`python main.py`) and listening on the \
             configured URL. Override it with --api-url or SENTIMENT_LENS_API_URL."
        )
    )]
    Unreachable { url: String, message: String },

    #[error("backend returned HTTP {status}: {detail}")]
    #[diagnostic(
        code(lens::client::status),
        help("The backend rejected the request. The detail above is its own explanation.")
    )]
    Status { status: u16, detail: String },

    #[error("failed to decode backend response: {message}")]
    #[diagnostic(
        code(lens::client::decode),
        help("The backend sent a response this client does not understand. Check that client and backend versions match.")
    )]
    Decode { message: String },

    #[error("analysis stream lost: {message}")]
    #[diagnostic(
        code(lens::client::stream_lost),
        help("The connection dropped before the analysis completed. Retry, or use the non-streaming mode.")
    )]
    StreamLost { message: String },

    #[error("analysis stream reported an error: {message}")]
    #[diagnostic(
        code(lens::client::stream_error),
        help("The backend failed while running the agents. Check the backend logs.")
    )]
    StreamFailed { message: String },

    #[error("analysis stopped")]
    #[diagnostic(code(lens::client::cancelled))]
    Cancelled,

    #[error("invalid input: {message}")]
    #[diagnostic(
        code(lens::client::invalid_input),
        help("Company names need at least two characters; comparisons take two or three companies.")
    )]
    InvalidInput { message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// ---------------------------------------------------------------------------
// History errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum HistoryError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(lens::history::io),
        help("Check that the data directory exists and is writable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("history database error: {message}")]
    #[diagnostic(
        code(lens::history::redb),
        help(
            "The history database could not be read or written. \
             Clear it with `sentiment-lens history clear` or point --data-dir at a fresh directory."
        )
    )]
    Redb { message: String },

    #[error("history serialization error: {message}")]
    #[diagnostic(
        code(lens::history::serde),
        help("A stored entry could not be decoded. It was probably written by an incompatible version.")
    )]
    Serialization { message: String },

    #[error("history entry not found: {id}")]
    #[diagnostic(
        code(lens::history::not_found),
        help("List saved analyses with `sentiment-lens history list`.")
    )]
    NotFound { id: String },
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// A string that does not name any variant of an option enum.
#[derive(Debug, Error, Diagnostic)]
#[error("unknown {kind}: \"{value}\"")]
#[diagnostic(code(lens::value::unknown))]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

pub type LensResult<T> = std::result::Result<T, LensError>;
