use std::{
    fmt::Display,
    io::{self, BufRead, BufReader, Cursor, Read},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crc32fast::Hasher;
use tracing::{debug, warn};

use crate::{error::GzipError, inflate::Inflater};

const ID1: u8 = 0x1f;
const ID2: u8 = 0x8b;
const CM_DEFLATE: u8 = 8;
const RESERVED_FLAGS: u8 = 0xe0;

/*
https://datatracker.ietf.org/doc/html/rfc1952#section-2.3

+---+---+---+---+---+---+---+---+---+---+
|ID1|ID2|CM |FLG|     MTIME     |XFL|OS | (more-->)
+---+---+---+---+---+---+---+---+---+---+

bit 0   FTEXT
bit 1   FHCRC
bit 2   FEXTRA
bit 3   FNAME
bit 4   FCOMMENT
bit 5   reserved
bit 6   reserved
bit 7   reserved
*/
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flags {
    FTEXT = 0,
    FHCRC = 1,
    FEXTRA = 2,
    FNAME = 3,
    FCOMMENT = 4,
}

impl Flags {
    pub fn is_set(self, flg: u8) -> bool {
        flg & (1 << self as u8) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFlags {
    None,
    MaxCompression,
    Fastest,
    Other(u8),
}

impl From<u8> for ExtraFlags {
    fn from(byte: u8) -> Self {
        match byte {
            0 => Self::None,
            2 => Self::MaxCompression,
            4 => Self::Fastest,
            b => Self::Other(b),
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    FAT,
    Amiga,
    VMS,
    Unix,
    VMCMS,
    Atari,
    HPFS,
    Mac,
    Z,
    CP,
    TOPS,
    NTFS,
    QDOS,
    Acorn,
    Unknown,
    Other(u8),
}

impl From<u8> for Os {
    fn from(byte: u8) -> Self {
        match byte {
            0 => Self::FAT,
            1 => Self::Amiga,
            2 => Self::VMS,
            3 => Self::Unix,
            4 => Self::VMCMS,
            5 => Self::Atari,
            6 => Self::HPFS,
            7 => Self::Mac,
            8 => Self::Z,
            9 => Self::CP,
            10 => Self::TOPS,
            11 => Self::NTFS,
            12 => Self::QDOS,
            13 => Self::Acorn,
            255 => Self::Unknown,
            b => Self::Other(b),
        }
    }
}

/// Decoding options for a gzip member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Check the header CRC (when present) and the CRC-32/ISIZE trailer.
    pub verify: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { verify: true }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// Reads header fields while keeping a running CRC of every byte, for FHCRC.
struct HeaderReader<'a, R> {
    inner: &'a mut R,
    crc: Hasher,
}

impl<'a, R: BufRead> HeaderReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            crc: Hasher::new(),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), GzipError> {
        self.inner.read_exact(buf).map_err(header_error)?;
        self.crc.update(buf);
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], GzipError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u16_le(&mut self) -> Result<u16, GzipError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// ISO 8859-1 text terminated by a zero byte.
    fn read_latin1(&mut self) -> Result<String, GzipError> {
        let mut buf = Vec::new();
        self.inner.read_until(0, &mut buf).map_err(header_error)?;
        self.crc.update(&buf);
        if buf.pop() != Some(0) {
            return Err(GzipError::TruncatedHeader);
        }
        Ok(buf.iter().map(|&b| b as char).collect())
    }

    /// Low 16 bits of the CRC-32 of everything read so far.
    fn crc16(&self) -> u16 {
        (self.crc.clone().finalize() & 0xffff) as u16
    }
}

fn header_error(e: io::Error) -> GzipError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => GzipError::TruncatedHeader,
        _ => GzipError::Io(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub text: bool,
    pub mtime: u32,
    pub xfl: ExtraFlags,
    pub os: Os,

    pub extra: Option<Vec<u8>>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub header_crc: Option<u16>,
}

impl Member {
    /// Parses a member header, leaving `reader` at the first deflate block.
    pub fn read<R: BufRead>(reader: &mut R, options: Options) -> Result<Self, GzipError> {
        let mut header = HeaderReader::new(reader);

        let [id1, id2, cm, flg] = header.read_array()?;
        if id1 != ID1 || id2 != ID2 {
            return Err(GzipError::BadMagic(id1, id2));
        }
        if cm != CM_DEFLATE {
            return Err(GzipError::UnsupportedMethod(cm));
        }
        if flg & RESERVED_FLAGS != 0 {
            return Err(GzipError::ReservedFlags(flg));
        }

        let mtime = u32::from_le_bytes(header.read_array()?);
        let [xfl, os] = header.read_array()?;

        let extra = if Flags::FEXTRA.is_set(flg) {
            let xlen = header.read_u16_le()?;
            let mut buf = vec![0u8; xlen as usize];
            header.read_exact(&mut buf)?;
            Some(buf)
        } else {
            None
        };
        let name = if Flags::FNAME.is_set(flg) {
            Some(header.read_latin1()?)
        } else {
            None
        };
        let comment = if Flags::FCOMMENT.is_set(flg) {
            Some(header.read_latin1()?)
        } else {
            None
        };
        let header_crc = if Flags::FHCRC.is_set(flg) {
            let actual = header.crc16();
            let expected = header.read_u16_le()?;
            if options.verify && expected != actual {
                return Err(GzipError::HeaderChecksumMismatch { expected, actual });
            }
            Some(expected)
        } else {
            None
        };

        Ok(Self {
            text: Flags::FTEXT.is_set(flg),
            mtime,
            xfl: xfl.into(),
            os: os.into(),
            extra,
            name,
            comment,
            header_crc,
        })
    }

    /// Modification time of the original file, if the member records one.
    pub fn modified(&self) -> Option<SystemTime> {
        (self.mtime != 0).then(|| UNIX_EPOCH + Duration::from_secs(self.mtime as u64))
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Name: {}",
            self.name.as_deref().unwrap_or("not present")
        )?;
        writeln!(
            f,
            "Comment: {}",
            self.comment.as_deref().unwrap_or("not present")
        )?;
        match self.mtime {
            0 => writeln!(f, "Modified: not available")?,
            t => writeln!(f, "Modified: {t} (seconds since epoch)")?,
        }
        writeln!(f, "Operating system: {:?}", self.os)?;
        writeln!(f, "Extra flags: {:?}", self.xfl)?;
        writeln!(f, "Text: {}", self.text)?;
        writeln!(
            f,
            "Extra field: {}",
            self.extra
                .as_ref()
                .map(|e| format!("{} bytes", e.len()))
                .unwrap_or("not present".to_string())
        )?;
        writeln!(
            f,
            "Header CRC: {}",
            self.header_crc
                .map(|crc| format!("{crc:#06x}"))
                .unwrap_or("not present".to_string())
        )
    }
}

/*
https://datatracker.ietf.org/doc/html/rfc1952#section-2.3

  0   1   2   3   4   5   6   7
+---+---+---+---+---+---+---+---+
|     CRC32     |     ISIZE     |
+---+---+---+---+---+---+---+---+
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    pub crc32: u32,
    pub isize: u32,
}

impl Trailer {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, GzipError> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => GzipError::TruncatedTrailer,
            _ => GzipError::Io(e),
        })?;

        Ok(Self {
            crc32: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            isize: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    pub fn verify(&self, data: &[u8]) -> Result<(), GzipError> {
        let actual = crc32fast::hash(data);
        if actual != self.crc32 {
            return Err(GzipError::ChecksumMismatch {
                expected: self.crc32,
                actual,
            });
        }

        let actual = data.len() as u32;
        if actual != self.isize {
            return Err(GzipError::LengthMismatch {
                expected: self.isize,
                actual,
            });
        }

        Ok(())
    }
}

/// Decodes the first member of a gzip stream.
pub fn decompress<R: BufRead>(
    mut reader: R,
    options: Options,
) -> Result<(Member, Vec<u8>), GzipError> {
    let member = Member::read(&mut reader, options)?;
    debug!(
        "gzip member: name {:?}, mtime {}, os {:?}",
        member.name, member.mtime, member.os
    );

    let mut inflater = Inflater::new(&mut reader);
    inflater.run()?;
    let (data, reader) = inflater.finish();

    let trailer = Trailer::read(&mut *reader)?;
    if options.verify {
        trailer.verify(&data)?;
    }

    if !reader.fill_buf()?.is_empty() {
        warn!("ignoring data after the first gzip member");
    }

    Ok((member, data))
}

/// Serves the decoded contents of a gzip member through `Read`.
#[derive(Debug)]
pub struct GzReader {
    member: Member,
    data: Cursor<Vec<u8>>,
}

impl GzReader {
    pub fn new<R: Read>(reader: R) -> Result<Self, GzipError> {
        Self::with_options(reader, Options::default())
    }

    pub fn with_options<R: Read>(reader: R, options: Options) -> Result<Self, GzipError> {
        let (member, data) = decompress(BufReader::new(reader), options)?;
        Ok(Self {
            member,
            data: Cursor::new(data),
        })
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data.into_inner()
    }
}

impl Read for GzReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}
