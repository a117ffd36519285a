use crate::{bits::Bits, errors::DecodeError};

/// Sequential reader over a [Bits] transmission.
///
/// A failed read leaves the position unchanged.
pub struct BitCursor<'a> {
    bits: &'a Bits,
    bit_pos: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bits: &'a Bits) -> Self {
        Self { bits, bit_pos: 0 }
    }

    /// Reads `width` bits as a big-endian unsigned integer and advances past them.
    pub fn read_bits(&mut self, width: usize) -> Result<u64, DecodeError> {
        let value = self.bits.read_bits_at(self.bit_pos, width)?;
        self.bit_pos += width;

        Ok(value)
    }

    /// Reads `width` bits without interpreting them. Any width is allowed.
    pub fn read_raw_bits(&mut self, width: usize) -> Result<Bits, DecodeError> {
        let raw = self.bits.slice(self.bit_pos, width)?;
        self.bit_pos += width;

        Ok(raw)
    }

    pub fn read_flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn position(&self) -> usize {
        self.bit_pos
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.bit_pos
    }
}
