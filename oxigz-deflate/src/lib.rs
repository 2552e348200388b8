//! # OxiGz Deflate
//!
//! Incremental raw DEFLATE (RFC 1951) compression and decompression.
//!
//! The streams produced and consumed here carry no zlib wrapper; framing is
//! left to the container (GZIP members in `oxigz`). The algorithm itself comes
//! from `flate2`'s pure-Rust backend, exposed through the
//! [`StreamCompressor`](oxigz_core::StreamCompressor) and
//! [`StreamDecompressor`](oxigz_core::StreamDecompressor) traits.
//!
//! ## Example
//!
//! ```rust
//! use oxigz_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod inflate;

/// Output is grown in steps of this many bytes.
pub(crate) const OUTPUT_CHUNK: usize = 32 * 1024;

/// Minimum spare output capacity handed to the backend per call.
pub(crate) const MIN_SPARE: usize = 64;

// Re-exports
pub use deflate::{Deflater, deflate};
pub use inflate::{Inflater, inflate};
