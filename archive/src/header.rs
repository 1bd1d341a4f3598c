use std::{io::Read, iter};

use bitstream::BitReader;
use tracing::debug;

use crate::{
    error::InflateError,
    huffman::Tree,
    tables::{
        CodeTrees, CODE_LENGTH_CODES, CODE_LENGTH_ORDER, END_OF_BLOCK, LITERAL_LENGTH_CODES,
    },
};

fn malformed(reason: impl Into<String>) -> InflateError {
    InflateError::MalformedDynamicHeader {
        reason: reason.into(),
    }
}

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.7

5 Bits: HLIT, # of Literal/Length codes - 257 (257 - 286)
5 Bits: HDIST, # of Distance codes - 1        (1 - 32)
4 Bits: HCLEN, # of Code Length codes - 4     (4 - 19)
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicHeader {
    pub literals: usize,
    pub distances: usize,
    pub code_lengths: usize,
}

impl DynamicHeader {
    pub fn read<R: Read>(bits: &mut BitReader<R>) -> Result<Self, InflateError> {
        let literals = bits.read_bits::<usize>(5)? + 257;
        let distances = bits.read_bits::<usize>(5)? + 1;
        let code_lengths = bits.read_bits::<usize>(4)? + 4;

        if literals > LITERAL_LENGTH_CODES {
            return Err(malformed(format!(
                "{literals} literal/length codes, at most {LITERAL_LENGTH_CODES} allowed"
            )));
        }

        Ok(Self {
            literals,
            distances,
            code_lengths,
        })
    }
}

/// Reads a dynamic block's code description and builds its two trees.
pub fn read_code_trees<R: Read>(bits: &mut BitReader<R>) -> Result<CodeTrees, InflateError> {
    let header = DynamicHeader::read(bits)?;
    debug!(
        "dynamic header: {} literal/length, {} distance, {} code length codes",
        header.literals, header.distances, header.code_lengths
    );

    let mut code_length_lengths = [0u8; CODE_LENGTH_CODES];
    for &symbol in CODE_LENGTH_ORDER.iter().take(header.code_lengths) {
        code_length_lengths[symbol] = bits.read_bits::<u8>(3)?;
    }
    let code_length_tree = Tree::from_lengths(&code_length_lengths)?;

    let lengths = read_lengths(
        &code_length_tree,
        bits,
        header.literals + header.distances,
    )?;
    let (literals, distances) = lengths.split_at(header.literals);

    if literals[END_OF_BLOCK as usize] == 0 {
        return Err(malformed("no code for end-of-block"));
    }

    Ok(CodeTrees {
        literals: Tree::from_lengths(literals)?,
        distances: Tree::from_lengths(distances)?,
    })
}

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.7

   0 - 15: Represent code lengths of 0 - 15
       16: Copy the previous code length 3 - 6 times.
           The next 2 bits indicate repeat length
       17: Repeat a code length of 0 for 3 - 10 times.
           (3 bits of length)
       18: Repeat a code length of 0 for 11 - 138 times
           (7 bits of length)
*/
pub fn read_lengths<R: Read>(
    tree: &Tree,
    bits: &mut BitReader<R>,
    total: usize,
) -> Result<Vec<u8>, InflateError> {
    let mut lengths = Vec::with_capacity(total);

    while lengths.len() < total {
        let symbol = tree.decode(bits)?;
        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                let previous = *lengths
                    .last()
                    .ok_or_else(|| malformed("repeat code 16 with no previous length"))?;
                (previous, 3 + bits.read_bits::<usize>(2)?)
            }
            17 => (0, 3 + bits.read_bits::<usize>(3)?),
            18 => (0, 11 + bits.read_bits::<usize>(7)?),
            _ => return Err(malformed(format!("code length symbol {symbol}"))),
        };

        if lengths.len() + repeat > total {
            return Err(malformed(format!(
                "repeat of {repeat} runs past the {total} declared code lengths"
            )));
        }
        lengths.extend(iter::repeat(value).take(repeat));
    }

    Ok(lengths)
}
