//! WASM bindings for the `packetcraft` BITS transmission decoder.
//!
//! JavaScript hands over a hex transmission and gets back a plain object with
//! the version sum, the evaluated value, and the packet tree. Trees can also be
//! encoded back to hex.
//!
//! ```text
//! // const decoder = new WasmDecoder(JSON.stringify({ max_depth: 64 }));
//! // const result = decoder.decode("9C0141080250320F1802104A08");
//! // result.version_sum  -> 20
//! // result.value        -> "1"
//! // result.tree         -> "eq(sum(1, 3), product(2, 2))"
//! // decoder.encode(result.root, "alternate") -> "9C0141080250320F1802104A08"
//! ```
//!
//! Values are decimal strings because they may exceed what a JS number holds
//! exactly. Errors are returned as strings.

mod convert;

use packetcraft::{Decoder, Encoder, serde::DecoderConfigDef};
use wasm_bindgen::prelude::*;

use crate::convert::JsPacket;

/// A configured decoder usable from JavaScript.
#[wasm_bindgen]
pub struct WasmDecoder {
    decoder: Decoder,
}

#[wasm_bindgen]
impl WasmDecoder {
    /// Creates a decoder. `config_json` must deserialize into [`DecoderConfigDef`];
    /// pass nothing for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmDecoder, JsValue> {
        let def: DecoderConfigDef = match config_json {
            Some(json) => serde_json::from_str(&json).map_err(convert::error_to_js)?,
            None => DecoderConfigDef::default(),
        };

        Ok(WasmDecoder {
            decoder: Decoder::new(def.into()),
        })
    }

    /// Decodes a hex transmission into `{ version_sum, bits_consumed, padding_bits, value, tree, root }`.
    pub fn decode(&self, hex: &str) -> Result<JsValue, JsValue> {
        let decoded = self.decoder.decode_hex(hex).map_err(convert::error_to_js)?;
        convert::to_js(&convert::decoded_to_js(&decoded))
    }

    /// Decodes and evaluates, returning only the value.
    pub fn evaluate(&self, hex: &str) -> Result<String, JsValue> {
        let decoded = self.decoder.decode_hex(hex).map_err(convert::error_to_js)?;
        Ok(packetcraft::evaluate(&decoded.root).to_string())
    }

    /// Encodes a packet tree (the `root` shape returned by [`WasmDecoder::decode`]) as hex.
    ///
    /// `policy` is `"total_bits"` (default), `"sub_packet_count"` or `"alternate"`.
    pub fn encode(&self, root: JsValue, policy: Option<String>) -> Result<String, JsValue> {
        let js: JsPacket = serde_wasm_bindgen::from_value(root).map_err(convert::error_to_js)?;
        let packet = convert::js_to_packet(js).map_err(convert::error_to_js)?;
        let policy = convert::policy_from_name(policy.as_deref()).map_err(convert::error_to_js)?;

        let bits = Encoder::new(policy)
            .encode(&packet)
            .map_err(convert::error_to_js)?;
        Ok(bits.to_hex())
    }
}
