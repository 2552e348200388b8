//! # OxiGz Core
//!
//! Core components for the OxiGz GZIP codec.
//!
//! - [`crc`]: CRC-32 for member trailers
//! - [`traits`]: the DEFLATE collaborator traits, compression level and flush mode
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Stream                                              │
//! │     GzipReader / GzipWriter, one-shot helpers (oxigz)   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Raw DEFLATE Deflater / Inflater (oxigz-deflate)     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     CRC-32, codec traits, errors                        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigz_core::crc::Crc32;
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use crc::{Crc32, crc32};
pub use error::{ErrorKind, OxiGzError, Result};
pub use traits::{CompressionLevel, FlushMode, StreamCompressor, StreamDecompressor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::crc::Crc32;
    pub use crate::error::{ErrorKind, OxiGzError, Result};
    pub use crate::traits::{CompressionLevel, FlushMode, StreamCompressor, StreamDecompressor};
}
