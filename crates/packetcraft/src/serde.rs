//! JSON-shaped descriptions of decoded transmissions and decoder settings.
//!
//! These types mirror [crate::packet::Packet] and [crate::parser::Decoded] in a
//! form that serializes naturally: every packet is an object with a `kind`, and
//! either a `value` (literals) or `children` (operators). They convert back into
//! core types with the same structural checks the decoder applies.

use serde::{Deserialize, Serialize};

use crate::{
    errors::Malformation,
    eval::checked_evaluate,
    packet::{Packet, PacketKind},
    parser::Decoded,
};

/// Packet type, spelled out.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum PacketKindDef {
    Sum,
    Product,
    Minimum,
    Maximum,
    Literal,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl From<PacketKind> for PacketKindDef {
    fn from(value: PacketKind) -> Self {
        match value {
            PacketKind::Sum => PacketKindDef::Sum,
            PacketKind::Product => PacketKindDef::Product,
            PacketKind::Minimum => PacketKindDef::Minimum,
            PacketKind::Maximum => PacketKindDef::Maximum,
            PacketKind::Literal => PacketKindDef::Literal,
            PacketKind::GreaterThan => PacketKindDef::GreaterThan,
            PacketKind::LessThan => PacketKindDef::LessThan,
            PacketKind::EqualTo => PacketKindDef::EqualTo,
        }
    }
}

impl From<PacketKindDef> for PacketKind {
    fn from(value: PacketKindDef) -> Self {
        match value {
            PacketKindDef::Sum => PacketKind::Sum,
            PacketKindDef::Product => PacketKind::Product,
            PacketKindDef::Minimum => PacketKind::Minimum,
            PacketKindDef::Maximum => PacketKind::Maximum,
            PacketKindDef::Literal => PacketKind::Literal,
            PacketKindDef::GreaterThan => PacketKind::GreaterThan,
            PacketKindDef::LessThan => PacketKind::LessThan,
            PacketKindDef::EqualTo => PacketKind::EqualTo,
        }
    }
}

/// One packet and its subtree.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PacketDef {
    /// 3-bit version field.
    pub version: u8,
    pub kind: PacketKindDef,
    /// Literal value; absent for operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u128>,
    /// Sub-packets in wire order; absent for literals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PacketDef>,
}

impl From<&Packet> for PacketDef {
    fn from(packet: &Packet) -> Self {
        PacketDef {
            version: packet.version,
            kind: packet.kind().into(),
            value: packet.literal_value(),
            children: packet.children().iter().map(PacketDef::from).collect(),
        }
    }
}

impl TryFrom<PacketDef> for Packet {
    type Error = Malformation;

    fn try_from(def: PacketDef) -> Result<Self, Self::Error> {
        let kind = PacketKind::from(def.kind);

        match (kind, def.value) {
            (PacketKind::Literal, Some(value)) if def.children.is_empty() => {
                Ok(Packet::literal(def.version, value))
            }
            (PacketKind::Literal, _) | (_, Some(_)) => Err(Malformation::PayloadMismatch { kind }),
            (_, None) => {
                let children = def
                    .children
                    .into_iter()
                    .map(Packet::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Packet::operator(def.version, kind, children)
            }
        }
    }
}

/// Summary of a decoded transmission.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DecodedDef {
    pub version_sum: u64,
    pub bits_consumed: usize,
    pub padding_bits: usize,
    /// Evaluated value, or `None` when evaluation overflows 128 bits.
    pub value: Option<u128>,
    pub root: PacketDef,
}

impl From<&Decoded> for DecodedDef {
    fn from(decoded: &Decoded) -> Self {
        DecodedDef {
            version_sum: decoded.version_sum,
            bits_consumed: decoded.bits_consumed,
            padding_bits: decoded.padding_bits,
            value: checked_evaluate(&decoded.root),
            root: PacketDef::from(&decoded.root),
        }
    }
}

/// Decoder settings as read from a configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfigDef {
    /// Nesting limit; defaults to [crate::parser::DEFAULT_MAX_DEPTH].
    #[serde(default)]
    pub max_depth: Option<usize>,
}
