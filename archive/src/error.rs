use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InflateError {
    #[error("stream ended after {pos} bytes, in the middle of a block")]
    TruncatedStream { pos: usize },
    #[error("block type 3 is reserved")]
    ReservedBlockType,
    #[error("stored block length {len:#06x} does not match its complement {nlen:#06x}")]
    StoredLengthMismatch { len: u16, nlen: u16 },
    #[error("code lengths do not form a prefix code: {reason}")]
    MalformedCodeLengths { reason: String },
    #[error("invalid dynamic block header: {reason}")]
    MalformedDynamicHeader { reason: String },
    #[error("invalid huffman code")]
    InvalidHuffmanCode,
    #[error("back-reference distance {distance} exceeds the {available} bytes produced")]
    InvalidBackReference { distance: usize, available: usize },
    #[error("bit reader misuse: {0}")]
    BitReader(bitstream::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<bitstream::Error> for InflateError {
    fn from(src: bitstream::Error) -> Self {
        match src {
            bitstream::Error::Truncated { pos } => Self::TruncatedStream { pos },
            bitstream::Error::Io(e) => Self::Io(e),
            other => Self::BitReader(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum GzipError {
    #[error("not a gzip member: magic bytes {0:#04x} {1:#04x}")]
    BadMagic(u8, u8),
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u8),
    #[error("reserved flag bits set: {0:#010b}")]
    ReservedFlags(u8),
    #[error("member header ended early")]
    TruncatedHeader,
    #[error("member trailer ended early")]
    TruncatedTrailer,
    #[error("header checksum mismatch: expected {expected:#06x}, computed {actual:#06x}")]
    HeaderChecksumMismatch { expected: u16, actual: u16 },
    #[error("crc32 mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("length mismatch: expected {expected} bytes (mod 2^32), decoded {actual}")]
    LengthMismatch { expected: u32, actual: u32 },
    #[error(transparent)]
    Inflate(#[from] InflateError),
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for GzipError {
    fn from(src: io::Error) -> Self {
        Self::Io(src)
    }
}
