//! Error types for the JWE library.

use thiserror::Error;

/// Error type returned by every fallible operation in this crate.
///
/// `DecryptionFailed` deliberately does not distinguish bad tag, bad wrapped
/// key, or bad shared secret: callers must not be able to use error variants
/// as a decryption oracle.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument had the wrong type, length, or was empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A recipient's `alg` or the document's `enc` named an algorithm this
    /// crate does not implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The JWE document was not well-formed JSON, had missing fields, or
    /// contained a field that failed to base64url-decode.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The key resolver returned no key for the requested id.
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// No recipient entry in the document matched the local key's id.
    #[error("no recipient matches the local key")]
    NoMatchingRecipient,

    /// AEAD open or AES key unwrap failed. Covers a tampered tag, a
    /// tampered wrapped key, and a wrong shared secret alike.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The external key resolver or key agreement provider returned an
    /// error. The cause is preserved for logging but never surfaced to a
    /// decrypt caller as a distinct variant.
    #[error("key provider error: {0}")]
    KeyProviderError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedDocument(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::MalformedDocument(format!("invalid base64url: {err}"))
    }
}

/// Result type for the JWE library.
pub type Result<T> = std::result::Result<T, Error>;
