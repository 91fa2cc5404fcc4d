//! Error types shared by the resolver, the pipeline and the dictionary collaborators.

use std::io;
use thiserror::Error;

/// Errors raised by dictionary collaborators while building or querying a dictionary.
///
/// # Variants
/// - `IoError`: reading or writing a dictionary resource failed.
/// - `ParseError`: dictionary text or a CBOR image could not be decoded.
/// - `NotFound`: a builder has no resource with the requested identifier.
/// - `LookupFailed`: a prefix lookup could not be answered.
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("I/O Error: {0}")]
    IoError(String),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(String),
}

impl From<io::Error> for DictionaryError {
    fn from(err: io::Error) -> Self {
        DictionaryError::IoError(err.to_string())
    }
}

impl From<serde_cbor::Error> for DictionaryError {
    fn from(err: serde_cbor::Error) -> Self {
        DictionaryError::ParseError(err.to_string())
    }
}

/// Errors surfaced by [`crate::OpenCC`] construction and conversion.
#[derive(Error, Debug)]
pub enum OpenCCError {
    /// The requested mode is not one of the supported conversion modes.
    #[error("unsupported conversion mode '{mode}', supported modes: {supported}")]
    UnsupportedMode { mode: String, supported: String },

    /// The chain configuration is missing a field or has the wrong shape.
    #[error("malformed config at {path}: {reason}")]
    MalformedConfig { path: String, reason: String },

    /// A configuration document could not be read from its directory.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The dictionary collaborator failed to build a leaf resource.
    #[error("failed to build dictionary '{resource}': {source}")]
    DictionaryBuild {
        resource: String,
        #[source]
        source: DictionaryError,
    },

    /// A prefix lookup failed during conversion.
    #[error("dictionary lookup failed: {0}")]
    Lookup(#[source] DictionaryError),
}

impl OpenCCError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        OpenCCError::MalformedConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, OpenCCError>;
