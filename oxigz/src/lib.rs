//! # OxiGz
//!
//! Streaming GZIP (RFC 1952) reader and writer.
//!
//! - [`GzipReader`]: decompresses one or more concatenated members, with
//!   `peek`, `readline` and emulated `seek` on the decompressed data
//! - [`GzipWriter`]: compresses into a single member
//! - [`GzipStream`]: either of the above behind one mode-dispatching type
//! - [`compress`] / [`decompress`]: one-shot helpers over byte buffers
//!
//! The DEFLATE codec comes from `oxigz-deflate` and the checksum from
//! `oxigz-core`; this crate handles the member framing around them.
//!
//! ## Example
//!
//! ```rust
//! use oxigz::{compress, decompress};
//!
//! let packed = compress(b"Hello, World!", 9).unwrap();
//! assert_eq!(&packed[..2], &[0x1F, 0x8B]);
//! assert_eq!(decompress(&packed).unwrap(), b"Hello, World!");
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use oxigz::{GzipOptions, GzipReader, GzipWriter};
//! use std::io::Cursor;
//!
//! let mut writer = GzipWriter::new(Vec::new(), GzipOptions::new().filename("log.txt")).unwrap();
//! writer.write(b"first\nsecond\n").unwrap();
//! let packed = writer.finish().unwrap();
//!
//! let mut reader = GzipReader::new(Cursor::new(packed));
//! assert_eq!(reader.readline(None).unwrap(), b"first\n");
//! assert_eq!(reader.peek(1).unwrap(), b"second\n");
//! assert_eq!(reader.header().unwrap().filename.as_deref(), Some("log.txt"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod header;
pub mod padded;
pub mod reader;
pub mod stream;
mod window;
pub mod writer;

// Re-exports
pub use header::{GzipHeader, GzipTrailer};
pub use oxigz_core::{CompressionLevel, ErrorKind, FlushMode, OxiGzError, Result};
pub use padded::PaddedReader;
pub use reader::{GzipReader, MemberState};
pub use stream::{GzipStream, OpenMode, StreamMode};
pub use writer::{GzipOptions, GzipWriter};

use std::io::Cursor;

/// Compress `data` into a single GZIP member at `level` (0-9).
///
/// The header carries no filename and the current time.
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    compress_with_options(data, GzipOptions::new().level(level))
}

/// Compress `data` into a single member whose header records `filename`.
pub fn compress_with_filename(data: &[u8], filename: &str, level: u8) -> Result<Vec<u8>> {
    compress_with_options(data, GzipOptions::new().level(level).filename(filename))
}

fn compress_with_options(data: &[u8], options: GzipOptions) -> Result<Vec<u8>> {
    let mut writer = GzipWriter::new(Vec::new(), options)?;
    writer.write(data)?;
    writer.finish()
}

/// Decompress every member in `data`, returning the concatenated output.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    GzipReader::new(Cursor::new(data)).read_all()
}
