use crate::huffman::Code;

/// LSB-first bit writer used to hand-craft DEFLATE streams in tests.
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, bit: bool) {
        if self.used == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 1 << self.used;
            }
        }
        self.used = (self.used + 1) % 8;
    }

    /// Writes the low `n` bits of `value`, least significant first.
    pub fn bits(&mut self, value: u32, n: u8) -> &mut Self {
        for i in 0..n {
            self.push((value >> i) & 1 == 1);
        }
        self
    }

    /// Writes a Huffman code, most significant bit first.
    pub fn code(&mut self, code: Code) -> &mut Self {
        for i in (0..code.length).rev() {
            self.push((code.value >> i) & 1 == 1);
        }
        self
    }

    pub fn align(&mut self) -> &mut Self {
        self.used = 0;
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.align();
        self.data.extend_from_slice(data);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.data.clone()
    }
}

impl BitWriter {
    /// Dynamic block header giving all 19 code length symbols a 5 bit code,
    /// so that symbol `s` is written as `cl_code(s)`.
    pub fn dynamic_header(&mut self, literals: usize, distances: usize) -> &mut Self {
        self.bits((literals - 257) as u32, 5)
            .bits((distances - 1) as u32, 5)
            .bits(19 - 4, 4);
        for _ in 0..19 {
            self.bits(5, 3);
        }
        self
    }
}

pub fn cl_code(symbol: u16) -> Code {
    Code {
        length: 5,
        value: symbol,
    }
}
