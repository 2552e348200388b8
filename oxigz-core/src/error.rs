//! Error types for OxiGz operations.
//!
//! Every failure the codec can hit is a variant of [`OxiGzError`]. Variants are
//! grouped into broad classes by [`ErrorKind`] so callers can tell a malformed
//! header apart from a corrupted payload or a misuse of the stream API without
//! matching on every variant.

use std::io;
use thiserror::Error;

/// Broad classification of an [`OxiGzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The member header is malformed or truncated.
    Format,
    /// The member trailer disagrees with the decompressed data.
    Integrity,
    /// The DEFLATE payload could not be decoded.
    Corrupted,
    /// The operation is not valid for the stream's mode or state.
    Unsupported,
    /// The underlying resource failed.
    Io,
}

/// The main error type for OxiGz operations.
#[derive(Debug, Error)]
pub enum OxiGzError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in member header.
    #[error("Not a gzip member: expected magic {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Compression method other than DEFLATE.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The method byte from the header.
        method: u8,
    },

    /// Invalid or truncated member header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// CRC checksum mismatch at a member trailer.
    #[error("CRC check failed: trailer has {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC stored in the trailer.
        expected: u32,
        /// CRC computed over the decompressed data.
        computed: u32,
    },

    /// Uncompressed size mismatch at a member trailer.
    #[error("Incorrect length of data produced: trailer has {expected}, computed {computed}")]
    SizeMismatch {
        /// Size (mod 2^32) stored in the trailer.
        expected: u32,
        /// Size (mod 2^32) of the decompressed data.
        computed: u32,
    },

    /// The input ended before a complete member trailer.
    #[error("Truncated member: expected {expected} trailer bytes, found {found}")]
    TruncatedMember {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        found: usize,
    },

    /// Corrupted DEFLATE data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Compressed byte offset (within the member) where decoding failed.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Operation not permitted in the current mode or state.
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Description of the rejected operation.
        operation: String,
    },
}

/// Result type alias for OxiGz operations.
pub type Result<T> = std::result::Result<T, OxiGzError>;

impl OxiGzError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u8) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u32, computed: u32) -> Self {
        Self::SizeMismatch { expected, computed }
    }

    /// Create a truncated member error.
    pub fn truncated_member(expected: usize, found: usize) -> Self {
        Self::TruncatedMember { expected, found }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidMagic { .. }
            | Self::UnsupportedMethod { .. }
            | Self::InvalidHeader { .. } => ErrorKind::Format,
            Self::CrcMismatch { .. } | Self::SizeMismatch { .. } | Self::TruncatedMember { .. } => {
                ErrorKind::Integrity
            }
            Self::CorruptedData { .. } => ErrorKind::Corrupted,
            Self::UnsupportedOperation { .. } => ErrorKind::Unsupported,
        }
    }
}

impl From<OxiGzError> for io::Error {
    fn from(err: OxiGzError) -> Self {
        let kind = match err {
            OxiGzError::Io(inner) => return inner,
            OxiGzError::UnsupportedOperation { .. } => io::ErrorKind::Unsupported,
            OxiGzError::TruncatedMember { .. } => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
