//! GZIP member header and trailer encoding.

use crate::padded::PaddedReader;
use oxigz_core::error::{OxiGzError, Result};
use std::io::{Read, Write};
use std::path::Path;

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Extra flags byte written into every header.
pub const XFL_DEFAULT: u8 = 2;

/// Operating system byte written into every header (unknown).
pub const OS_UNKNOWN: u8 = 0xFF;

/// Size of the member trailer (CRC-32 + ISIZE).
pub const TRAILER_SIZE: usize = 8;

/// GZIP header flags.
pub mod flags {
    /// Text file.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
}

/// GZIP member header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Compression method (always 8 for DEFLATE).
    pub method: u8,
    /// Flags.
    pub flags: u8,
    /// Modification time (Unix timestamp).
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system.
    pub os: u8,
    /// Original filename (if FNAME flag set), decoded as Latin-1.
    pub filename: Option<String>,
    /// Comment (if FCOMMENT flag set), decoded as Latin-1.
    pub comment: Option<String>,
    /// Header CRC16 (if FHCRC flag set). Not validated.
    pub header_crc: Option<u16>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            method: CM_DEFLATE,
            flags: 0,
            mtime: 0,
            xfl: XFL_DEFAULT,
            os: OS_UNKNOWN,
            filename: None,
            comment: None,
            header_crc: None,
        }
    }
}

impl GzipHeader {
    /// Create a new GZIP header with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the header written for a member of `filename`.
    ///
    /// Only the final path component is recorded, without a trailing `.gz`.
    /// Names that cannot be represented in Latin-1 are left out entirely.
    pub fn for_member(filename: &str, mtime: u32) -> Self {
        let filename = member_name(filename).map(|bytes| latin1_decode(&bytes));
        Self {
            flags: if filename.is_some() { flags::FNAME } else { 0 },
            mtime,
            filename,
            ..Self::default()
        }
    }

    /// Write the header to a writer.
    ///
    /// FNAME and FCOMMENT are emitted only when the corresponding text is
    /// present and encodable as Latin-1; their flag bits follow suit.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let filename = self.filename.as_deref().and_then(latin1_encode);
        let comment = self.comment.as_deref().and_then(latin1_encode);

        let mut header_flags =
            self.flags & !(flags::FNAME | flags::FCOMMENT | flags::FEXTRA | flags::FHCRC);
        if filename.is_some() {
            header_flags |= flags::FNAME;
        }
        if comment.is_some() {
            header_flags |= flags::FCOMMENT;
        }

        writer.write_all(&GZIP_MAGIC)?;
        writer.write_all(&[self.method, header_flags])?;
        writer.write_all(&self.mtime.to_le_bytes())?;
        writer.write_all(&[self.xfl, self.os])?;

        if let Some(name) = filename {
            writer.write_all(&name)?;
            writer.write_all(&[0])?;
        }
        if let Some(comment) = comment {
            writer.write_all(&comment)?;
            writer.write_all(&[0])?;
        }

        Ok(())
    }

    /// Read a member header.
    ///
    /// Returns `Ok(None)` when the source is exhausted before the first magic
    /// byte, which is how a stream of members ends.
    pub fn read<R: Read>(source: &mut PaddedReader<R>) -> Result<Option<Self>> {
        let magic = source.read(2)?;
        if magic.is_empty() {
            return Ok(None);
        }
        if magic != GZIP_MAGIC {
            return Err(OxiGzError::invalid_magic(GZIP_MAGIC.to_vec(), magic));
        }

        let fixed = read_field(source, 8, "fixed header")?;
        let method = fixed[0];
        if method != CM_DEFLATE {
            return Err(OxiGzError::unsupported_method(method));
        }
        let flag_byte = fixed[1];
        let mtime = u32::from_le_bytes([fixed[2], fixed[3], fixed[4], fixed[5]]);
        let xfl = fixed[6];
        let os = fixed[7];

        // Extra field is skipped
        if flag_byte & flags::FEXTRA != 0 {
            let xlen = read_field(source, 2, "extra field length")?;
            let xlen = u16::from_le_bytes([xlen[0], xlen[1]]) as usize;
            read_field(source, xlen, "extra field")?;
        }

        let filename = if flag_byte & flags::FNAME != 0 {
            Some(latin1_decode(&read_null_terminated(source)?))
        } else {
            None
        };

        let comment = if flag_byte & flags::FCOMMENT != 0 {
            Some(latin1_decode(&read_null_terminated(source)?))
        } else {
            None
        };

        let header_crc = if flag_byte & flags::FHCRC != 0 {
            let crc = read_field(source, 2, "header CRC")?;
            Some(u16::from_le_bytes([crc[0], crc[1]]))
        } else {
            None
        };

        Ok(Some(Self {
            method,
            flags: flag_byte,
            mtime,
            xfl,
            os,
            filename,
            comment,
            header_crc,
        }))
    }
}

/// GZIP member trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipTrailer {
    /// CRC-32 of the uncompressed member data.
    pub crc: u32,
    /// Uncompressed member size mod 2^32.
    pub size: u32,
}

impl GzipTrailer {
    /// Create a trailer for `size` bytes of data with checksum `crc`.
    pub fn new(crc: u32, size: u64) -> Self {
        Self {
            crc,
            size: (size & 0xFFFF_FFFF) as u32,
        }
    }

    /// Write the trailer to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.crc.to_le_bytes())?;
        writer.write_all(&self.size.to_le_bytes())?;
        Ok(())
    }

    /// Read a trailer.
    pub fn read<R: Read>(source: &mut PaddedReader<R>) -> Result<Self> {
        let buf = source.read(TRAILER_SIZE)?;
        if buf.len() < TRAILER_SIZE {
            return Err(OxiGzError::truncated_member(TRAILER_SIZE, buf.len()));
        }
        Ok(Self {
            crc: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            size: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Check the trailer against the data actually produced.
    pub fn verify(&self, crc: u32, size: u64) -> Result<()> {
        if self.crc != crc {
            return Err(OxiGzError::crc_mismatch(self.crc, crc));
        }
        let size = (size & 0xFFFF_FFFF) as u32;
        if self.size != size {
            return Err(OxiGzError::size_mismatch(self.size, size));
        }
        Ok(())
    }
}

/// Header name bytes for `filename`: Latin-1 basename without `.gz`.
fn member_name(filename: &str) -> Option<Vec<u8>> {
    let base = Path::new(filename).file_name()?.to_str()?;
    let mut bytes = latin1_encode(base)?;
    if bytes.ends_with(b".gz") {
        bytes.truncate(bytes.len() - 3);
    }
    (!bytes.is_empty()).then_some(bytes)
}

fn latin1_encode(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn read_field<R: Read>(source: &mut PaddedReader<R>, len: usize, what: &str) -> Result<Vec<u8>> {
    let buf = source.read(len)?;
    if buf.len() < len {
        return Err(OxiGzError::invalid_header(format!(
            "truncated {}: expected {} bytes, found {}",
            what,
            len,
            buf.len()
        )));
    }
    Ok(buf)
}

/// Read up to and including a NUL; end of input also terminates.
fn read_null_terminated<R: Read>(source: &mut PaddedReader<R>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    loop {
        match source.read(1)?.first() {
            None | Some(0) => break,
            Some(&byte) => bytes.push(byte),
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigz_core::ErrorKind;
    use std::io::Cursor;

    fn source(bytes: &[u8]) -> PaddedReader<Cursor<Vec<u8>>> {
        PaddedReader::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_gzip_header_default() {
        let header = GzipHeader::new();
        assert_eq!(header.method, CM_DEFLATE);
        assert_eq!(header.flags, 0);
        assert_eq!(header.os, OS_UNKNOWN);
    }

    #[test]
    fn test_write_header_layout() {
        let mut out = Vec::new();
        GzipHeader::for_member("dir/data.txt.gz", 0x01020304)
            .write(&mut out)
            .unwrap();

        let mut expected = vec![0x1F, 0x8B, 8, flags::FNAME, 4, 3, 2, 1, 2, 0xFF];
        expected.extend_from_slice(b"data.txt\0");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_header_latin1_name() {
        let header = GzipHeader::for_member("café.txt", 0);
        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        assert_eq!(&out[10..], b"caf\xE9.txt\0");
    }

    #[test]
    fn test_write_header_non_latin1_name() {
        let header = GzipHeader::for_member("データ.txt", 7);
        assert_eq!(header.filename, None);

        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out[3] & flags::FNAME, 0);
    }

    #[test]
    fn test_write_header_empty_name() {
        assert_eq!(GzipHeader::for_member("", 0).filename, None);
        assert_eq!(GzipHeader::for_member(".gz", 0).filename, None);
    }

    #[test]
    fn test_read_all_optional_fields() {
        let mut bytes = vec![
            0x1F,
            0x8B,
            8,
            flags::FTEXT | flags::FHCRC | flags::FEXTRA | flags::FNAME | flags::FCOMMENT,
            0x78,
            0x56,
            0x34,
            0x12,
            0,
            3,
        ];
        bytes.extend_from_slice(&[3, 0, b'x', b'y', b'z']);
        bytes.extend_from_slice(b"name.txt\0");
        bytes.extend_from_slice(b"a comment\0");
        bytes.extend_from_slice(&[0xAD, 0xDE]);
        bytes.extend_from_slice(b"payload");

        let mut src = source(&bytes);
        let header = GzipHeader::read(&mut src).unwrap().unwrap();
        assert_eq!(header.mtime, 0x12345678);
        assert_eq!(header.os, 3);
        assert_eq!(header.filename.as_deref(), Some("name.txt"));
        assert_eq!(header.comment.as_deref(), Some("a comment"));
        assert_eq!(header.header_crc, Some(0xDEAD));
        assert_eq!(src.read(16).unwrap(), b"payload");
    }

    #[test]
    fn test_read_roundtrip() {
        let mut header = GzipHeader::for_member("report.csv", 1_700_000_000);
        header.comment = Some("nightly".to_string());
        let mut out = Vec::new();
        header.write(&mut out).unwrap();

        let parsed = GzipHeader::read(&mut source(&out)).unwrap().unwrap();
        assert_eq!(parsed.flags, flags::FNAME | flags::FCOMMENT);
        assert_eq!(parsed.filename.as_deref(), Some("report.csv"));
        assert_eq!(parsed.comment.as_deref(), Some("nightly"));
        assert_eq!(parsed.mtime, 1_700_000_000);
    }

    #[test]
    fn test_read_clean_eof() {
        assert!(GzipHeader::read(&mut source(b"")).unwrap().is_none());
    }

    #[test]
    fn test_read_bad_magic() {
        let err = GzipHeader::read(&mut source(b"PK\x03\x04")).unwrap_err();
        assert!(matches!(err, OxiGzError::InvalidMagic { .. }));

        // A lone stray byte is not a clean end of stream.
        let err = GzipHeader::read(&mut source(b"\x1F")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_read_bad_method() {
        let err = GzipHeader::read(&mut source(&[0x1F, 0x8B, 7, 0, 0, 0, 0, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, OxiGzError::UnsupportedMethod { method: 7 }));
    }

    #[test]
    fn test_read_truncated() {
        let err = GzipHeader::read(&mut source(&[0x1F, 0x8B, 8, 0, 0])).unwrap_err();
        assert!(matches!(err, OxiGzError::InvalidHeader { .. }));

        let short_extra = [0x1F, 0x8B, 8, flags::FEXTRA, 0, 0, 0, 0, 0, 0, 9, 0, 1];
        let err = GzipHeader::read(&mut source(&short_extra)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_read_unterminated_name() {
        let mut bytes = vec![0x1F, 0x8B, 8, flags::FNAME, 0, 0, 0, 0, 0, 0xFF];
        bytes.extend_from_slice(b"no-nul");
        let header = GzipHeader::read(&mut source(&bytes)).unwrap().unwrap();
        assert_eq!(header.filename.as_deref(), Some("no-nul"));
    }

    #[test]
    fn test_trailer() {
        let trailer = GzipTrailer::new(0xCAFEBABE, (1u64 << 32) + 5);
        assert_eq!(trailer.size, 5);

        let mut out = Vec::new();
        trailer.write(&mut out).unwrap();
        assert_eq!(out, [0xBE, 0xBA, 0xFE, 0xCA, 5, 0, 0, 0]);

        let parsed = GzipTrailer::read(&mut source(&out)).unwrap();
        assert_eq!(parsed, trailer);
        parsed.verify(0xCAFEBABE, 5).unwrap();
        assert!(matches!(
            parsed.verify(0xCAFEBABF, 5),
            Err(OxiGzError::CrcMismatch { .. })
        ));
        assert!(matches!(
            parsed.verify(0xCAFEBABE, 6),
            Err(OxiGzError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_trailer_truncated() {
        let err = GzipTrailer::read(&mut source(&[1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            OxiGzError::TruncatedMember {
                expected: 8,
                found: 3
            }
        ));
    }
}
