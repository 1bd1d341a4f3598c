use std::{
    fmt::{Debug, Display},
    io::Read,
};

use bitstream::BitReader;
use itertools::Itertools;

use crate::{error::InflateError, tables::MAX_CODE_LENGTH};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Default, Clone, Copy)]
struct Node {
    symbol: Option<u16>,
    children: [Option<NodeId>; 2],
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("symbol", &self.symbol)
            .field("zero", &self.children[0])
            .field("one", &self.children[1])
            .finish()
    }
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.symbol.is_some()
    }

    fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }
}

/// A code word: `length` bits of `value`, most significant bit sent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    pub length: u8,
    pub value: u16,
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.length as usize)
    }
}

/*
https://datatracker.ietf.org/doc/html/rfc1951#section-3.2.2

1) Count the number of codes for each code length. Let
   bl_count[N] be the number of codes of length N, N >= 1.

2) Find the numerical value of the smallest code for each
   code length.

3) Assign numerical values to all codes, using consecutive
   values for all codes of the same length with the base
   values determined at step 2. Codes that are never used
   (which have a bit length of zero) must not be assigned a
   value.
*/
pub fn canonical_codes(lengths: &[u8]) -> Result<Vec<Option<Code>>, InflateError> {
    if let Some(length) = lengths.iter().find(|&&l| l > MAX_CODE_LENGTH) {
        return Err(InflateError::MalformedCodeLengths {
            reason: format!("code length {length} exceeds {MAX_CODE_LENGTH}"),
        });
    }

    let bl_count = lengths.iter().copied().filter(|&l| l > 0).counts();

    let mut next_code = [0u32; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH {
        let shorter = bl_count.get(&(bits - 1)).copied().unwrap_or(0) as u32;
        code = (code + shorter) << 1;
        next_code[bits as usize] = code;
    }

    lengths
        .iter()
        .map(|&length| {
            if length == 0 {
                return Ok(None);
            }

            let value = next_code[length as usize];
            if value >= 1 << length {
                return Err(InflateError::MalformedCodeLengths {
                    reason: format!("too many codes of length {length}"),
                });
            }
            next_code[length as usize] += 1;

            Ok(Some(Code {
                length,
                value: value as u16,
            }))
        })
        .collect()
}

/// Canonical prefix code stored as an arena of nodes, the root at index 0.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn from_lengths(lengths: &[u8]) -> Result<Tree, InflateError> {
        let codes = canonical_codes(lengths)?;

        let mut tree = Tree {
            nodes: Vec::with_capacity(2 * lengths.len()),
        };
        tree.nodes.push(Node::default());

        for (symbol, code) in codes.into_iter().enumerate() {
            if let Some(code) = code {
                tree.insert(symbol as u16, code)?;
            }
        }

        Ok(tree)
    }

    fn insert(&mut self, symbol: u16, code: Code) -> Result<(), InflateError> {
        let collision = || InflateError::MalformedCodeLengths {
            reason: format!("code {code} for symbol {symbol} collides with another code"),
        };

        let mut cur = ROOT;
        for i in (0..code.length).rev() {
            if self.nodes[cur].is_leaf() {
                return Err(collision());
            }

            let bit = ((code.value >> i) & 1) as usize;
            cur = match self.nodes[cur].children[bit] {
                Some(next) => next,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[cur].children[bit] = Some(id);
                    id
                }
            };
        }

        let node = &mut self.nodes[cur];
        if node.is_leaf() || node.has_children() {
            return Err(collision());
        }
        node.symbol = Some(symbol);
        Ok(())
    }

    /// Walks from the root one bit at a time until a leaf is reached.
    pub fn decode<R: Read>(&self, bits: &mut BitReader<R>) -> Result<u16, InflateError> {
        let mut cur = ROOT;
        loop {
            let bit = bits.read_bool()? as usize;
            cur = self.nodes[cur].children[bit].ok_or(InflateError::InvalidHuffmanCode)?;

            if let Some(symbol) = self.nodes[cur].symbol {
                return Ok(symbol);
            }
        }
    }

    /// True when no symbol has a code.
    pub fn is_empty(&self) -> bool {
        !self.nodes[ROOT].has_children()
    }
}
