//! Error types for hex input, bit reading, packet decoding and encoding.

use thiserror::Error;

use crate::packet::PacketKind;

/// Errors produced when turning hexadecimal text into [crate::bits::Bits].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// A character outside `0-9`, `a-f`, `A-F`.
    #[error("invalid hex digit {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },
}

/// Errors produced while decoding a transmission (see [crate::parser::Decoder::decode]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read asked for more bits than remain in the transmission.
    #[error("requested {requested} bits but only {remaining} remain")]
    OutOfRange { requested: usize, remaining: usize },
    /// More than 64 bits were requested as a single integer.
    #[error("cannot read {0} bits into a 64-bit integer")]
    TooManyBitsRead(usize),
    /// The packet structure violates the format.
    #[error("malformed packet: {0}")]
    MalformedPacket(Malformation),
    /// Type id outside 0..=7.
    #[error("unknown packet type id {0}")]
    UnknownTypeId(u8),
    /// Literal has more significant bits than a [crate::packet::Value] holds.
    #[error("literal needs {bits} significant bits, more than 128")]
    LiteralTooWide { bits: usize },
    /// Packets nest deeper than [crate::parser::DecoderConfig::max_depth].
    #[error("packets nest deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error(transparent)]
    Hex(#[from] HexError),
}

/// Structural violations found after a packet's fields were read successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformation {
    /// Length-type 0 children consumed more bits than the declared total.
    #[error("sub-packets consumed {consumed} bits, declared {declared}")]
    LengthMismatch { declared: usize, consumed: usize },
    /// A comparison packet without exactly two children.
    #[error("{kind:?} packet has {children} sub-packets, expected 2")]
    ComparisonArity { kind: PacketKind, children: usize },
    /// An aggregate packet (sum, product, minimum, maximum) with no children.
    #[error("{kind:?} packet has no sub-packets")]
    EmptyOperands { kind: PacketKind },
    /// A literal kind was paired with sub-packets, or an operator kind with a value.
    #[error("{kind:?} packet has the wrong payload")]
    PayloadMismatch { kind: PacketKind },
}

impl From<Malformation> for DecodeError {
    fn from(value: Malformation) -> Self {
        DecodeError::MalformedPacket(value)
    }
}

/// Errors produced when writing a [crate::packet::Packet] back to bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Version does not fit the 3-bit header field.
    #[error("version {0} does not fit in 3 bits")]
    VersionOutOfRange(u8),
    /// Children need more bits than the 15-bit length field can declare.
    #[error("sub-packets need {0} bits, the length field holds at most 32767")]
    SubPacketBitsOverflow(usize),
    /// More children than the 11-bit count field can declare.
    #[error("{0} sub-packets exceed the 11-bit count field")]
    SubPacketCountOverflow(usize),
}
