//! Owned bit sequences and the hexadecimal boundary of a transmission.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! Bits past [Bits::len] in the last byte are always zero.

use std::fmt;

use crate::errors::{DecodeError, HexError};

/// An ordered sequence of bits packed into bytes, MSB-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits {
    bytes: Vec<u8>,
    len: usize,
}

impl Bits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Bits {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Wraps whole bytes; the resulting length is `8 * bytes.len()`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() * 8;
        Bits { bytes, len }
    }

    /// Decodes a hex transmission, four bits per digit.
    ///
    /// Surrounding whitespace is ignored. Odd digit counts are allowed, the last
    /// digit then contributes a half byte.
    pub fn from_hex(text: &str) -> Result<Self, HexError> {
        let text = text.trim();
        if !text.is_ascii() {
            return Err(first_invalid_digit(text));
        }

        let even = text.len() - text.len() % 2;

        let bytes = match hex::decode(&text[..even]) {
            Ok(bytes) => bytes,
            Err(hex::FromHexError::InvalidHexCharacter { c, index }) => {
                return Err(HexError::InvalidDigit { index, found: c });
            }
            Err(_) => return Err(first_invalid_digit(text)),
        };

        let mut bits = Bits::from_bytes(bytes);
        if let Some(last) = text[even..].chars().next() {
            let nibble = hex_char_to_bits(last).ok_or(HexError::InvalidDigit {
                index: even,
                found: last,
            })?;
            bits.push_bits(nibble as u64, 4);
        }

        Ok(bits)
    }

    /// Renders the bits as uppercase hex, zero-padding to a whole digit.
    pub fn to_hex(&self) -> String {
        let mut out = hex::encode_upper(&self.bytes);
        out.truncate(self.len.div_ceil(4));
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the bit at `pos`, or `None` past the end.
    pub fn get(&self, pos: usize) -> Option<bool> {
        if pos >= self.len {
            return None;
        }

        Some((self.bytes[pos / 8] >> (7 - pos % 8)) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(|pos| self.get(pos))
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }

        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - self.len % 8);
        }

        self.len += 1;
    }

    /// Appends the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: usize) {
        for shift in (0..width).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    pub fn extend_from_bits(&mut self, other: &Bits) {
        for bit in other.iter() {
            self.push(bit);
        }
    }

    /// Shortens the sequence to `len` bits. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        self.bytes.truncate(len.div_ceil(8));
        if len % 8 != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] &= 0xFF << (8 - len % 8);
        }
        self.len = len;
    }

    /// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits). MSB-first.
    pub fn read_bits_at(&self, bit_pos: usize, n: usize) -> Result<u64, DecodeError> {
        if n > 64 {
            return Err(DecodeError::TooManyBitsRead(n));
        }

        self.check_range(bit_pos, n)?;

        let mut value = 0u64;
        for pos in bit_pos..bit_pos + n {
            let bit = (self.bytes[pos / 8] >> (7 - pos % 8)) & 1;
            value = (value << 1) | bit as u64;
        }

        Ok(value)
    }

    /// Copies `n` bits starting at `bit_pos` into a new sequence.
    pub fn slice(&self, bit_pos: usize, n: usize) -> Result<Bits, DecodeError> {
        self.check_range(bit_pos, n)?;

        let mut out = Bits::with_capacity(n);
        for pos in bit_pos..bit_pos + n {
            out.push((self.bytes[pos / 8] >> (7 - pos % 8)) & 1 == 1);
        }

        Ok(out)
    }

    /// Interprets the whole sequence as a big-endian unsigned integer.
    ///
    /// Leading zero bits are free; only significant bits count against the 128-bit limit.
    pub fn to_u128(&self) -> Result<u128, DecodeError> {
        let significant = match self.iter().position(|bit| bit) {
            Some(first_one) => self.len - first_one,
            None => return Ok(0),
        };

        if significant > 128 {
            return Err(DecodeError::LiteralTooWide { bits: significant });
        }

        Ok(self
            .iter()
            .skip(self.len - significant)
            .fold(0u128, |acc, bit| (acc << 1) | bit as u128))
    }

    fn check_range(&self, bit_pos: usize, n: usize) -> Result<(), DecodeError> {
        if bit_pos.checked_add(n).is_none_or(|end| end > self.len) {
            return Err(DecodeError::OutOfRange {
                requested: n,
                remaining: self.len.saturating_sub(bit_pos),
            });
        }

        Ok(())
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut bits = Bits::new();
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Maps one hex digit to its 4-bit group (`'0'` -> `0b0000` ... `'F'` -> `0b1111`).
pub fn hex_char_to_bits(c: char) -> Option<u8> {
    c.to_digit(16).map(|digit| digit as u8)
}

fn first_invalid_digit(text: &str) -> HexError {
    text.char_indices()
        .find(|(_, c)| hex_char_to_bits(*c).is_none())
        .map(|(index, found)| HexError::InvalidDigit { index, found })
        .unwrap_or(HexError::InvalidDigit {
            index: text.len(),
            found: '\0',
        })
}
