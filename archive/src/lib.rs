//! gzip (RFC 1952) member decoding on top of a DEFLATE (RFC 1951) decoder.

pub mod deflate;
pub mod error;
pub mod gzip;
pub mod header;
pub mod huffman;
pub mod inflate;
pub mod tables;
pub mod window;

#[cfg(test)]
mod test_utils;

pub use error::{GzipError, InflateError};
pub use gzip::{decompress, GzReader, Member, Options};
pub use inflate::{inflate, Inflater};
