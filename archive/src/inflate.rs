use std::io::Read;

use bitstream::BitReader;
use tracing::{debug, trace};

use crate::{
    deflate::{Block, BlockType},
    error::InflateError,
    header,
    tables::{
        fixed_trees, CodeTrees, DISTANCE_BASE, DISTANCE_CODES, DISTANCE_EXTRA, END_OF_BLOCK,
        LENGTH_BASE, LENGTH_EXTRA,
    },
    window::OutputWindow,
};

#[derive(Debug, Clone, Copy)]
enum State {
    ReadHeader,
    Body(Block),
    CheckFinal(bool),
}

/// One DEFLATE decoding session over a byte source positioned at the first
/// block.
#[derive(Debug)]
pub struct Inflater<R> {
    bits: BitReader<R>,
    window: OutputWindow,
    blocks: usize,
}

impl<R: Read> Inflater<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bits: BitReader::new(reader),
            window: OutputWindow::new(),
            blocks: 0,
        }
    }

    /// Decodes blocks until the one flagged as final has been consumed.
    pub fn run(&mut self) -> Result<(), InflateError> {
        let mut state = State::ReadHeader;
        loop {
            state = match state {
                State::ReadHeader => State::Body(Block::read(&mut self.bits)?),
                State::Body(block) => {
                    debug!(
                        "block {}: {:?}, last: {}, at bit {}",
                        self.blocks,
                        block.kind,
                        block.last,
                        self.bits.position()
                    );
                    match block.kind {
                        BlockType::Stored => self.stored()?,
                        BlockType::Fixed => {
                            decode_symbols(&mut self.bits, &mut self.window, fixed_trees()?)?
                        }
                        BlockType::Dynamic => {
                            let trees = header::read_code_trees(&mut self.bits)?;
                            decode_symbols(&mut self.bits, &mut self.window, &trees)?
                        }
                    }
                    self.blocks += 1;
                    State::CheckFinal(block.last)
                }
                State::CheckFinal(false) => State::ReadHeader,
                State::CheckFinal(true) => break,
            }
        }

        debug!(
            "inflated {} bytes from {} blocks",
            self.window.len(),
            self.blocks
        );
        Ok(())
    }

    /*
    https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.4

    Any bits of input up to the next byte boundary are ignored.
    The rest of the block consists of the following information:

         0   1   2   3   4...
       +---+---+---+---+================================+
       |  LEN  | NLEN  |... LEN bytes of literal data...|
       +---+---+---+---+================================+
    */
    fn stored(&mut self) -> Result<(), InflateError> {
        let len = self.bits.read_u16_le()?;
        let nlen = self.bits.read_u16_le()?;
        if len != !nlen {
            return Err(InflateError::StoredLengthMismatch { len, nlen });
        }

        trace!("stored block of {} bytes", len);
        let mut buf = vec![0u8; len as usize];
        self.bits.read_bytes(&mut buf)?;
        self.window.extend_from_slice(&buf);
        Ok(())
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Bytes consumed from the source, counting a partially used last byte.
    pub fn total_in(&self) -> usize {
        self.bits.position().div_ceil(8)
    }

    pub fn output(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Returns the decoded bytes and the byte source, which is positioned
    /// right after the deflate stream.
    pub fn finish(self) -> (Vec<u8>, R) {
        (self.window.into_inner(), self.bits.into_inner())
    }
}

/// Decodes literal/length symbols of one compressed block up to and
/// including its end-of-block symbol.
pub fn decode_symbols<R: Read>(
    bits: &mut BitReader<R>,
    window: &mut OutputWindow,
    trees: &CodeTrees,
) -> Result<(), InflateError> {
    loop {
        let symbol = trees.literals.decode(bits)?;
        match symbol {
            0..=255 => window.push(symbol as u8),
            END_OF_BLOCK => return Ok(()),
            257..=285 => {
                let index = (symbol - 257) as usize;
                let length = LENGTH_BASE[index] as usize
                    + bits.read_bits::<usize>(LENGTH_EXTRA[index] as usize)?;

                let index = trees.distances.decode(bits)? as usize;
                if index >= DISTANCE_CODES {
                    return Err(InflateError::InvalidHuffmanCode);
                }
                let distance = DISTANCE_BASE[index] as usize
                    + bits.read_bits::<usize>(DISTANCE_EXTRA[index] as usize)?;

                window.copy_match(distance, length)?;
            }
            _ => return Err(InflateError::InvalidHuffmanCode),
        }
    }
}

/// Decodes a complete raw DEFLATE stream.
pub fn inflate<R: Read>(reader: R) -> Result<Vec<u8>, InflateError> {
    let mut inflater = Inflater::new(reader);
    inflater.run()?;
    let (data, _) = inflater.finish();
    Ok(data)
}
