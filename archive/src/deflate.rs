use std::io::Read;

use bitstream::BitReader;

use crate::error::InflateError;

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.3

Each block of compressed data begins with 3 header bits
containing the following data:

   first bit       BFINAL
   next 2 bits     BTYPE

BTYPE specifies how the data are compressed, as follows:

   00 - no compression
   01 - compressed with fixed Huffman codes
   10 - compressed with dynamic Huffman codes
   11 - reserved (error)
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Stored,
    Fixed,
    Dynamic,
}

impl TryFrom<u8> for BlockType {
    type Error = InflateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stored),
            1 => Ok(Self::Fixed),
            2 => Ok(Self::Dynamic),
            _ => Err(InflateError::ReservedBlockType),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub last: bool,
    pub kind: BlockType,
}

impl Block {
    pub fn read<R: Read>(bits: &mut BitReader<R>) -> Result<Self, InflateError> {
        let last = bits.read_bool()?;
        let kind = bits.read_bits::<u8>(2)?.try_into()?;
        Ok(Self { last, kind })
    }
}
