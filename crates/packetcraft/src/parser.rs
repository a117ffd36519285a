//! Recursive-descent decoding of a transmission into a [Packet] tree.
//!
//! A [Decoder] holds configuration only. Each call to [Decoder::decode] opens a
//! fresh [Session] which owns the version-sum accumulator, so independent
//! transmissions can be decoded concurrently from one decoder.

use tracing::{debug, trace};

use crate::{
    bits::Bits,
    cursor::BitCursor,
    errors::{DecodeError, Malformation},
    packet::{Packet, PacketKind, Value},
};

const VERSION_BITS: usize = 3;
const TYPE_ID_BITS: usize = 3;
const GROUP_PAYLOAD_BITS: usize = 4;
pub(crate) const TOTAL_LENGTH_BITS: usize = 15;
pub(crate) const SUB_PACKET_COUNT_BITS: usize = 11;

/// Nesting limit used by [DecoderConfig::default].
///
/// Decoding recurses once per level; this depth fits a 2 MiB thread stack in
/// unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How an operator packet delimits its sub-packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthType {
    /// Length-type bit `0`: a 15-bit total of sub-packet bits follows.
    TotalBits,
    /// Length-type bit `1`: an 11-bit sub-packet count follows.
    SubPacketCount,
}

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Deepest packet nesting accepted; the outermost packet is level 1.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit. Deeper transmissions fail with [DecodeError::NestingTooDeep].
    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::DecoderConfigDef> for DecoderConfig {
    fn from(value: crate::serde::DecoderConfigDef) -> Self {
        DecoderConfig {
            max_depth: value.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}

/// One packet together with the number of bits it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub bits: usize,
    pub packet: Packet,
}

/// Result of decoding a whole transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The outermost packet.
    pub root: Packet,
    /// Bits occupied by the outermost packet and everything inside it.
    pub bits_consumed: usize,
    /// Trailing bits left unread after the outermost packet.
    pub padding_bits: usize,
    /// Sum of every packet's version field.
    pub version_sum: u64,
}

/// Decodes BITS transmissions. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Opens a parse session for reading packets one at a time.
    pub fn session(&self) -> Session<'_> {
        Session {
            config: &self.config,
            version_sum: 0,
        }
    }

    /// Decodes exactly one outermost packet. Bits after it are padding and are never parsed.
    pub fn decode(&self, bits: &Bits) -> Result<Decoded, DecodeError> {
        let mut cursor = BitCursor::new(bits);
        let mut session = self.session();

        let Parsed {
            bits: bits_consumed,
            packet,
        } = session.parse_packet(&mut cursor)?;

        debug!(
            bits_consumed,
            padding_bits = cursor.remaining(),
            version_sum = session.version_sum,
            "decoded transmission"
        );

        Ok(Decoded {
            root: packet,
            bits_consumed,
            padding_bits: cursor.remaining(),
            version_sum: session.version_sum,
        })
    }

    pub fn decode_hex(&self, text: &str) -> Result<Decoded, DecodeError> {
        let bits = Bits::from_hex(text)?;
        self.decode(&bits)
    }
}

/// State of a single decode: the running version sum.
pub struct Session<'d> {
    config: &'d DecoderConfig,
    version_sum: u64,
}

impl Session<'_> {
    /// Version fields of every packet parsed so far in this session.
    pub fn version_sum(&self) -> u64 {
        self.version_sum
    }

    /// Parses one packet, and everything nested in it, at the cursor.
    pub fn parse_packet(&mut self, cursor: &mut BitCursor<'_>) -> Result<Parsed, DecodeError> {
        self.parse_at(cursor, 1)
    }

    fn parse_at(&mut self, cursor: &mut BitCursor<'_>, depth: usize) -> Result<Parsed, DecodeError> {
        if depth > self.config.max_depth {
            return Err(DecodeError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        let start = cursor.position();
        let version = cursor.read_bits(VERSION_BITS)? as u8;
        let kind = PacketKind::try_from(cursor.read_bits(TYPE_ID_BITS)? as u8)?;
        self.version_sum += version as u64;

        trace!(at = start, version, ?kind, depth, "packet header");

        let packet = match kind {
            PacketKind::Literal => Packet::literal(version, read_literal(cursor)?),
            _ => {
                let children = self.parse_children(cursor, depth)?;
                Packet::operator(version, kind, children)?
            }
        };

        Ok(Parsed {
            bits: cursor.position() - start,
            packet,
        })
    }

    fn parse_children(
        &mut self,
        cursor: &mut BitCursor<'_>,
        depth: usize,
    ) -> Result<Vec<Packet>, DecodeError> {
        let length_type = if cursor.read_flag()? {
            LengthType::SubPacketCount
        } else {
            LengthType::TotalBits
        };

        let mut children = Vec::new();

        match length_type {
            LengthType::TotalBits => {
                let declared = cursor.read_bits(TOTAL_LENGTH_BITS)? as usize;
                let mut consumed = 0;

                while consumed < declared {
                    let child = self.parse_at(cursor, depth + 1)?;
                    consumed += child.bits;
                    children.push(child.packet);
                }

                if consumed != declared {
                    return Err(Malformation::LengthMismatch { declared, consumed }.into());
                }
            }
            LengthType::SubPacketCount => {
                let count = cursor.read_bits(SUB_PACKET_COUNT_BITS)? as usize;
                children.reserve(count);

                for _ in 0..count {
                    children.push(self.parse_at(cursor, depth + 1)?.packet);
                }
            }
        }

        Ok(children)
    }
}

/// Reads 5-bit groups until one has a clear continuation flag and joins their payloads.
fn read_literal(cursor: &mut BitCursor<'_>) -> Result<Value, DecodeError> {
    let mut payload = Bits::new();

    loop {
        let more = cursor.read_flag()?;
        payload.extend_from_bits(&cursor.read_raw_bits(GROUP_PAYLOAD_BITS)?);

        if !more {
            break;
        }
    }

    payload.to_u128()
}

/// Decodes `bits` with the default [DecoderConfig].
pub fn decode(bits: &Bits) -> Result<Decoded, DecodeError> {
    Decoder::default().decode(bits)
}

/// Decodes a hex transmission with the default [DecoderConfig].
pub fn decode_hex(text: &str) -> Result<Decoded, DecodeError> {
    Decoder::default().decode_hex(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::HexError, packet::Expr};

    fn bits(text: &str) -> Bits {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c == '1')
            .collect()
    }

    fn literal_values(packet: &Packet) -> Vec<Value> {
        packet
            .children()
            .iter()
            .filter_map(Packet::literal_value)
            .collect()
    }

    #[test]
    fn test_single_group_literal() {
        let decoded = decode(&bits("010 100 01011")).unwrap();

        assert_eq!(decoded.root, Packet::literal(2, 0b1011));
        assert_eq!(decoded.bits_consumed, 11);
        assert_eq!(decoded.padding_bits, 0);
    }

    #[test]
    fn test_multi_group_literal() {
        let decoded = decode(&bits("000 100 10001 10010 00011")).unwrap();

        assert_eq!(decoded.root.literal_value(), Some(0x123));
        assert_eq!(decoded.bits_consumed, 6 + 5 * 3);
    }

    #[test]
    fn test_literal_d2fe28() {
        let decoded = decode_hex("D2FE28").unwrap();

        assert_eq!(decoded.root, Packet::literal(6, 2021));
        assert_eq!(decoded.bits_consumed, 21);
        assert_eq!(decoded.padding_bits, 3);
        assert_eq!(decoded.version_sum, 6);
    }

    #[test]
    fn test_operator_sub_packet_count() {
        let decoded = decode_hex("EE00D40C823060").unwrap();

        assert_eq!(decoded.root.kind(), PacketKind::Maximum);
        assert_eq!(literal_values(&decoded.root), vec![1, 2, 3]);
        assert_eq!(decoded.version_sum, 7 + 2 + 4 + 1);
        assert_eq!(decoded.version_sum, 14);
    }

    #[test]
    fn test_operator_total_length() {
        let decoded = decode_hex("38006F45291200").unwrap();

        assert_eq!(decoded.root.kind(), PacketKind::LessThan);
        assert_eq!(decoded.root.type_id(), 6);
        assert_eq!(literal_values(&decoded.root), vec![10, 20]);
        assert_eq!(decoded.bits_consumed, 6 + 1 + 15 + 27);
    }

    #[test]
    fn test_version_sums() {
        let cases = [
            ("8A004A801A8002F478", 16),
            ("620080001611562C8802118E34", 12),
            ("C0015000016115A2E0802F182340", 23),
            ("A0016C880162017C3686B18A3D4780", 31),
        ];

        for (hex, expected) in cases {
            let decoded = decode_hex(hex).unwrap();
            assert_eq!(decoded.version_sum, expected, "{hex}");
            assert_eq!(decoded.root.version_sum(), expected, "{hex}");
        }
    }

    #[test]
    fn test_nested_operators() {
        let decoded = decode_hex("8A004A801A8002F478").unwrap();

        assert_eq!(decoded.root.depth(), 4);
        assert_eq!(decoded.root.packet_count(), 4);
        assert!(matches!(decoded.root.expr, Expr::Minimum(_)));
    }

    #[test]
    fn test_trailing_bits_are_not_parsed() {
        // literal 5 followed by a complete second literal packet
        let decoded = decode(&bits("000 100 00101 000 100 00110")).unwrap();

        assert_eq!(decoded.root.literal_value(), Some(5));
        assert_eq!(decoded.padding_bits, 11);
    }

    #[test]
    fn test_truncated_literal_group() {
        assert_eq!(
            decode(&bits("000 100 10001")).unwrap_err(),
            DecodeError::OutOfRange {
                requested: 1,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(
            decode(&bits("0001")).unwrap_err(),
            DecodeError::OutOfRange {
                requested: 3,
                remaining: 1
            }
        );
    }

    #[test]
    fn test_truncated_examples_fail() {
        for hex in ["D2FE28", "38006F45291200", "EE00D40C823060", "C200B40A82"] {
            let mut transmission = Bits::from_hex(hex).unwrap();
            let consumed = decode(&transmission).unwrap().bits_consumed;

            transmission.truncate(consumed - 1);
            assert!(
                matches!(
                    decode(&transmission),
                    Err(DecodeError::OutOfRange { .. })
                ),
                "{hex}"
            );
        }
    }

    #[test]
    fn test_length_overshoot_is_malformed() {
        // sum, total length 10, but its only child is an 11-bit literal
        let decoded = decode(&bits("000 000 0 000000000001010 000 100 00001"));

        assert_eq!(
            decoded.unwrap_err(),
            DecodeError::MalformedPacket(Malformation::LengthMismatch {
                declared: 10,
                consumed: 11
            })
        );
    }

    #[test]
    fn test_empty_comparison_is_malformed() {
        let decoded = decode(&bits("000 101 0 000000000000000"));

        assert_eq!(
            decoded.unwrap_err(),
            DecodeError::MalformedPacket(Malformation::ComparisonArity {
                kind: PacketKind::GreaterThan,
                children: 0
            })
        );
    }

    #[test]
    fn test_comparison_with_three_children_is_malformed() {
        let decoded = decode(&bits(
            "000 111 1 00000000011 000 100 00001 000 100 00001 000 100 00001",
        ));

        assert_eq!(
            decoded.unwrap_err(),
            DecodeError::MalformedPacket(Malformation::ComparisonArity {
                kind: PacketKind::EqualTo,
                children: 3
            })
        );
    }

    #[test]
    fn test_empty_aggregate_is_malformed() {
        let decoded = decode(&bits("000 010 1 00000000000"));

        assert_eq!(
            decoded.unwrap_err(),
            DecodeError::MalformedPacket(Malformation::EmptyOperands {
                kind: PacketKind::Minimum
            })
        );
    }

    #[test]
    fn test_declared_length_beyond_input() {
        let decoded = decode(&bits("000 000 0 111111111111111 000 100 00001"));

        assert!(matches!(
            decoded.unwrap_err(),
            DecodeError::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        // three nested single-child sums around a literal
        let nested = bits(
            "000 000 1 00000000001 000 000 1 00000000001 000 000 1 00000000001 000 100 00111",
        );

        let mut config = DecoderConfig::new();
        config.set_max_depth(3);
        assert_eq!(
            Decoder::new(config.clone()).decode(&nested).unwrap_err(),
            DecodeError::NestingTooDeep { limit: 3 }
        );

        config.set_max_depth(4);
        let decoded = Decoder::new(config).decode(&nested).unwrap();
        assert_eq!(decoded.root.depth(), 4);
    }

    fn nested_sums(levels: usize) -> Bits {
        let mut transmission = Bits::new();
        for _ in 0..levels {
            // sum, one sub-packet by count
            transmission.push_bits(0b000_000_1, 7);
            transmission.push_bits(1, SUB_PACKET_COUNT_BITS);
        }
        transmission.push_bits(0b000_100_00111, 11);
        transmission
    }

    #[test]
    fn test_default_nesting_limit_on_spawned_thread() {
        let rejected = std::thread::spawn(|| decode(&nested_sums(DEFAULT_MAX_DEPTH)))
            .join()
            .unwrap();
        assert_eq!(
            rejected.unwrap_err(),
            DecodeError::NestingTooDeep {
                limit: DEFAULT_MAX_DEPTH
            }
        );

        let accepted = std::thread::spawn(|| {
            decode(&nested_sums(DEFAULT_MAX_DEPTH - 1)).map(|decoded| decoded.root.depth())
        })
        .join()
        .unwrap();
        assert_eq!(accepted.unwrap(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_wide_literal() {
        let mut transmission = bits("000 100");
        for _ in 0..32 {
            transmission.push_bits(0b11111, 5);
        }
        transmission.push_bits(0b01111, 5);

        assert_eq!(
            decode(&transmission).unwrap_err(),
            DecodeError::LiteralTooWide { bits: 132 }
        );
    }

    #[test]
    fn test_session_accumulates_across_packets() {
        let transmission = bits("011 100 00101 101 100 00110");
        let decoder = Decoder::default();
        let mut cursor = BitCursor::new(&transmission);
        let mut session = decoder.session();

        let first = session.parse_packet(&mut cursor).unwrap();
        let second = session.parse_packet(&mut cursor).unwrap();

        assert_eq!(first.bits, 11);
        assert_eq!(second.packet.literal_value(), Some(6));
        assert_eq!(session.version_sum(), 3 + 5);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_decode_hex_invalid_digit() {
        assert_eq!(
            decode_hex("D2FG28").unwrap_err(),
            DecodeError::Hex(HexError::InvalidDigit {
                index: 3,
                found: 'G'
            })
        );
    }
}
