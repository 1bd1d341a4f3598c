use std::sync::OnceLock;

use crate::{error::InflateError, huffman::Tree};

pub const END_OF_BLOCK: u16 = 256;
pub const LITERAL_LENGTH_CODES: usize = 286;
pub const DISTANCE_CODES: usize = 30;
pub const CODE_LENGTH_CODES: usize = 19;
pub const MAX_CODE_LENGTH: u8 = 15;

/// Order in which the code length code lengths appear in a dynamic header.
pub const CODE_LENGTH_ORDER: [usize; CODE_LENGTH_CODES] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.5

     Extra               Extra               Extra
Code Bits Length(s) Code Bits Lengths   Code Bits Length(s)
---- ---- ------     ---- ---- -------   ---- ---- -------
 257   0     3       267   1   15,16     277   4   67-82
 258   0     4       268   1   17,18     278   4   83-98
 259   0     5       269   2   19-22     279   4   99-114
 260   0     6       270   2   23-26     280   4  115-130
 261   0     7       271   2   27-30     281   5  131-162
 262   0     8       272   2   31-34     282   5  163-194
 263   0     9       273   3   35-42     283   5  195-226
 264   0    10       274   3   43-50     284   5  227-257
 265   1  11,12      275   3   51-58     285   0    258
 266   1  13,14      276   3   59-66
*/
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
pub const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub const DISTANCE_BASE: [u16; DISTANCE_CODES] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
pub const DISTANCE_EXTRA: [u8; DISTANCE_CODES] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.6

Lit Value    Bits        Codes
---------    ----        -----
  0 - 143     8          00110000 through 10111111
144 - 255     9          110010000 through 111111111
256 - 279     7          0000000 through 0010111
280 - 287     8          11000000 through 11000111

Literal/length values 286-287 will never actually occur in the
compressed data, but participate in the code construction.
*/
pub const FIXED_LITERAL_LENGTHS: [u8; 288] = {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < lengths.len() {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
};

pub const FIXED_DISTANCE_LENGTHS: [u8; DISTANCE_CODES] = [5; DISTANCE_CODES];

/// Literal/length and distance trees used to decode one compressed block.
#[derive(Debug)]
pub struct CodeTrees {
    pub literals: Tree,
    pub distances: Tree,
}

static FIXED_TREES: OnceLock<CodeTrees> = OnceLock::new();

/// Trees for fixed Huffman blocks, built on first use and shared afterwards.
pub fn fixed_trees() -> Result<&'static CodeTrees, InflateError> {
    if let Some(trees) = FIXED_TREES.get() {
        return Ok(trees);
    }

    let trees = CodeTrees {
        literals: Tree::from_lengths(&FIXED_LITERAL_LENGTHS)?,
        distances: Tree::from_lengths(&FIXED_DISTANCE_LENGTHS)?,
    };
    Ok(FIXED_TREES.get_or_init(|| trees))
}
