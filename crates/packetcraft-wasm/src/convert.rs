use std::fmt::Display;

use packetcraft::{
    Decoded, LengthTypePolicy, Malformation, Packet, PacketKind,
    serde::PacketKindDef,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Packet shape exchanged with JavaScript.
///
/// Literal values travel as decimal strings: they can exceed `Number.MAX_SAFE_INTEGER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsPacket {
    pub version: u8,
    pub kind: PacketKindDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsPacket>,
}

#[derive(Debug, Serialize)]
pub struct JsDecoded {
    pub version_sum: u64,
    pub bits_consumed: usize,
    pub padding_bits: usize,
    /// `null` when evaluation overflows.
    pub value: Option<String>,
    pub tree: String,
    pub root: JsPacket,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("invalid literal value {0:?}")]
    InvalidValue(String),
    #[error("unknown length type policy {0:?}")]
    InvalidPolicy(String),
    #[error(transparent)]
    Malformed(#[from] Malformation),
}

pub fn packet_to_js(packet: &Packet) -> JsPacket {
    JsPacket {
        version: packet.version,
        kind: packet.kind().into(),
        value: packet.literal_value().map(|value| value.to_string()),
        children: packet.children().iter().map(packet_to_js).collect(),
    }
}

pub fn js_to_packet(js: JsPacket) -> Result<Packet, ConvertError> {
    let kind = PacketKind::from(js.kind);

    match (kind, js.value) {
        (PacketKind::Literal, Some(text)) if js.children.is_empty() => {
            let value = text
                .trim()
                .parse()
                .map_err(|_| ConvertError::InvalidValue(text.clone()))?;
            Ok(Packet::literal(js.version, value))
        }
        (PacketKind::Literal, _) | (_, Some(_)) => {
            Err(ConvertError::Malformed(Malformation::PayloadMismatch { kind }))
        }
        (_, None) => {
            let children = js
                .children
                .into_iter()
                .map(js_to_packet)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Packet::operator(js.version, kind, children)?)
        }
    }
}

pub fn decoded_to_js(decoded: &Decoded) -> JsDecoded {
    JsDecoded {
        version_sum: decoded.version_sum,
        bits_consumed: decoded.bits_consumed,
        padding_bits: decoded.padding_bits,
        value: packetcraft::checked_evaluate(&decoded.root).map(|value| value.to_string()),
        tree: decoded.root.to_string(),
        root: packet_to_js(&decoded.root),
    }
}

pub fn policy_from_name(name: Option<&str>) -> Result<LengthTypePolicy, ConvertError> {
    match name {
        None | Some("total_bits") => Ok(LengthTypePolicy::TotalBits),
        Some("sub_packet_count") => Ok(LengthTypePolicy::SubPacketCount),
        Some("alternate") => Ok(LengthTypePolicy::Alternate),
        Some(other) => Err(ConvertError::InvalidPolicy(other.to_string())),
    }
}

pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub fn error_to_js<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}
