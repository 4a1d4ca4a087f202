use std::path::PathBuf;

use thiserror::Error;

use super::model::PortPair;
use super::variant::Encoding;

// ---------------------------------------------------------------------------
// Reader errors
// ---------------------------------------------------------------------------

/// Structural problems found while reading a file's header and data block.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    /// Pair labels are single digits, so only 1..=9 ports are addressable.
    #[error("unsupported port count {0} (expected 1..=9)")]
    UnsupportedPortCount(usize),

    #[error("header not found at line {line}: {reason}")]
    HeaderNotFound { line: usize, reason: String },

    #[error("header is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("line {line}: expected a blank separator after the header")]
    MissingSeparator { line: usize },

    #[error("data block has {lines} lines, not a multiple of the {span}-line record span")]
    RaggedRecords { lines: usize, span: usize },

    #[error("record {record} (line {line}): expected {expected} fields, found {found}")]
    FieldCount {
        record: usize,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },

    #[error("unrecognized format variant '{0}'")]
    UnknownVariant(String),
}

// ---------------------------------------------------------------------------
// Normalizer errors
// ---------------------------------------------------------------------------

/// Raw records, or the port count given with them, violated the reader's
/// output contract.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizationError {
    #[error("unsupported port count {0} (expected 1..=9)")]
    UnsupportedPortCount(usize),

    #[error("record {record}: no value for {pair}")]
    MissingField { record: usize, pair: PortPair },

    #[error("record {record}: {pair} is not {expected:?}-encoded")]
    EncodingMismatch {
        record: usize,
        pair: PortPair,
        expected: Encoding,
    },
}

// ---------------------------------------------------------------------------
// Filename metadata errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum FilenameError {
    #[error("'{0}' has no usable file name")]
    NoFileName(String),

    #[error("'{filename}': extension has no port-count digit (expected e.g. .s2p)")]
    NoPortDigit { filename: String },
}

// ---------------------------------------------------------------------------
// Loading from disk
// ---------------------------------------------------------------------------

/// Anything that can go wrong turning a path into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Filename(#[from] FilenameError),
}
