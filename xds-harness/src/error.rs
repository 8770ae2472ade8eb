//! Error types for the harness core.

use std::fmt;

use thiserror::Error;

/// Error type for the harness core.
#[derive(Debug, Error)]
pub enum Error {
    /// The service mnemonic is not one of `lds`, `cds`, `rds` or `eds`.
    #[error("cannot find type URL for given service: {0:?}")]
    UnknownService(String),

    /// A resource payload could not be decoded into the schema of its response.
    #[error("failed to decode resource {index} of {type_url}")]
    Decode {
        /// Position of the offending resource within the response.
        index: usize,
        /// Type URL the payload was dispatched on.
        type_url: String,
        /// What went wrong.
        #[source]
        cause: DecodeCause,
    },

    /// A serialized discovery message could not be decoded.
    #[error("failed to decode discovery message: {0}")]
    Wire(#[source] prost::DecodeError),

    /// An identical exchange has already been recorded.
    ///
    /// This is not transient: it means the same message was observed twice.
    #[error("{0} record already exists")]
    DuplicateRecord(ExchangeKind),

    /// The message could not be canonically serialized.
    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored exchanges could not be deleted.
    #[error("couldn't delete the records: {0}")]
    Purge(#[source] rusqlite::Error),

    /// The schema script could not be applied.
    #[error("failed to apply schema: {0}")]
    Migration(#[source] rusqlite::Error),

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns `true` if the error signals an already recorded exchange.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateRecord(_))
    }
}

/// The reason a single resource payload failed to decode.
#[derive(Debug, Error)]
pub enum DecodeCause {
    /// The payload declares a different schema than the response it arrived in.
    #[error("expected type URL {expected:?}, resource carries {actual:?}")]
    TypeMismatch {
        /// Type URL of the response.
        expected: String,
        /// Type URL of the payload itself.
        actual: String,
    },
    /// The payload bytes are not a valid message of the expected schema.
    #[error(transparent)]
    Protobuf(#[from] prost::DecodeError),
}

/// Which side of an exchange a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    /// A discovery request sent to the control plane.
    Request,
    /// A discovery response received from the control plane.
    Response,
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeKind::Request => f.write_str("request"),
            ExchangeKind::Response => f.write_str("response"),
        }
    }
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
