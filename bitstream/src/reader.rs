use std::{
    cmp::min,
    fmt::Debug,
    io::{self, Read},
    mem::size_of,
};

use num_traits::{AsPrimitive, PrimInt, Unsigned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("byte source exhausted after {pos} bytes")]
    Truncated { pos: usize },
    #[error("cannot fit {size} bits into a {max} bit integer")]
    Overflow { size: usize, max: usize },
    #[error(transparent)]
    Io(io::Error),
}

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.1.1

Data elements are packed into bytes in order of increasing bit number
within the byte, i.e., starting with the least-significant bit of the
byte. Data elements other than Huffman codes are packed starting with
the least-significant bit of the data element.
*/
pub struct BitReader<R> {
    inner: R,
    current: u8,
    remaining: u8,
    bytes_read: usize,
}

impl<R> Debug for BitReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitReader")
            .field("bytes_read", &self.bytes_read)
            .field("current", &format_args!("{:08b}", self.current))
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            bytes_read: 0,
        }
    }

    fn fetch(&mut self) -> Result<u8, Error> {
        let mut byte = [0u8; 1];
        self.fill(&mut byte)?;
        Ok(byte[0])
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.bytes_read += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::Truncated {
                pos: self.bytes_read,
            }),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        if self.remaining == 0 {
            self.current = self.fetch()?;
            self.remaining = 8;
        }

        let bit = self.current & 1 == 1;
        self.current >>= 1;
        self.remaining -= 1;
        Ok(bit)
    }

    /// Reads `n` bits, the first bit read landing in the least significant
    /// position of the result.
    pub fn read_bits<T>(&mut self, n: usize) -> Result<T, Error>
    where
        T: 'static + PrimInt + Unsigned,
        u8: AsPrimitive<T>,
    {
        let max = size_of::<T>() * 8;
        if n > max {
            return Err(Error::Overflow { size: n, max });
        }

        let mut res = T::zero();
        let mut filled = 0;
        while filled < n {
            if self.remaining == 0 {
                self.current = self.fetch()?;
                self.remaining = 8;
            }

            let take = min(self.remaining as usize, n - filled);
            let mask = ((1u16 << take) - 1) as u8;
            let chunk: T = (self.current & mask).as_();
            res = res | (chunk << filled);

            self.current = self.current.checked_shr(take as u32).unwrap_or(0);
            self.remaining -= take as u8;
            filled += take;
        }

        Ok(res)
    }

    /// Drops whatever is left of a partially consumed byte.
    pub fn align_to_byte(&mut self) {
        self.current = 0;
        self.remaining = 0;
    }

    pub fn is_aligned(&self) -> bool {
        self.remaining == 0
    }

    /// Copies raw bytes from the source, aligning to a byte boundary first.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.align_to_byte();
        self.fill(buf)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.read_bytes(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.bytes_read * 8 - self.remaining as usize
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Hands back the byte source, positioned right after the last byte that
    /// was touched. Unread bits of that byte are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(&[0b0000_0101], 3, 0b101)]
    #[case(&[0b1010_1100], 4, 0b1100)]
    #[case(&[0xFF, 0x01], 9, 0x1FF)]
    #[case(&[0x34, 0x12], 16, 0x1234)]
    #[case(&[0x00, 0x80], 16, 0x8000)]
    fn test_read_bits(#[case] input: &[u8], #[case] n: usize, #[case] expected: u16) {
        let mut reader = BitReader::new(input);
        assert_eq!(reader.read_bits::<u16>(n).unwrap(), expected);
        assert_eq!(reader.position(), n);
    }

    #[rstest]
    fn test_read_bool_order() {
        let mut reader = BitReader::new(&[0b1000_0110u8][..]);
        let bits: Vec<bool> = (0..8).map(|_| reader.read_bool().unwrap()).collect();
        assert_eq!(
            bits,
            vec![false, true, true, false, false, false, false, true]
        );
    }

    #[rstest]
    fn test_read_across_byte_boundary() {
        let mut reader = BitReader::new(&[0b1110_0000u8, 0b0000_0101][..]);
        assert_eq!(reader.read_bits::<u8>(5).unwrap(), 0);
        assert_eq!(reader.read_bits::<u8>(6).unwrap(), 0b101111);
        assert_eq!(reader.position(), 11);
    }

    #[rstest]
    fn test_align_then_raw_bytes() {
        let mut reader = BitReader::new(&[0xFFu8, 0x34, 0x12, 0xAB][..]);
        assert_eq!(reader.read_bits::<u8>(3).unwrap(), 0b111);
        assert!(!reader.is_aligned());

        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert!(reader.is_aligned());
        assert_eq!(reader.position(), 24);

        let mut rest = [0u8; 1];
        reader.read_bytes(&mut rest).unwrap();
        assert_eq!(rest, [0xAB]);
    }

    #[rstest]
    fn test_truncated() {
        let mut reader = BitReader::new(&[0x00u8][..]);
        assert!(matches!(
            reader.read_bits::<u16>(9),
            Err(Error::Truncated { pos: 1 })
        ));

        let mut reader = BitReader::new(&[0u8; 0][..]);
        assert!(matches!(reader.read_bool(), Err(Error::Truncated { pos: 0 })));
    }

    #[rstest]
    fn test_overflow() {
        let mut reader = BitReader::new(&[0xFFu8, 0xFF][..]);
        assert!(matches!(
            reader.read_bits::<u8>(9),
            Err(Error::Overflow { size: 9, max: 8 })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[rstest]
    fn test_into_inner_resumes_after_touched_byte() {
        let input = [0x01u8, 0xAA, 0xBB];
        let mut reader = BitReader::new(&input[..]);
        assert!(reader.read_bool().unwrap());

        let rest = reader.into_inner();
        assert_eq!(rest, &[0xAA, 0xBB]);
    }
}
