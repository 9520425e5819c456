//! Core error types.

use thiserror::Error;

/// Errors that can occur during object store and history operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No object exists at the path derived from the digest.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Stored bytes failed decompression or contradicted their header.
    #[error("corrupt object: {0}")]
    Corrupt(String),

    /// An object header named a kind outside blob/tree/commit/tag.
    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    /// A KVLM or tree payload violated its grammar.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A caller precondition did not hold.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The operation is not supported for this entry kind.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The repository declares a format version this build cannot read.
    #[error("unsupported repository format version {0}")]
    UnsupportedFormatVersion(u32),

    /// A digest string was not 40 hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
