//! # packetcraft
//!
//! Decoder, encoder and evaluator for BITS transmissions: hex-encoded bit
//! streams holding a tree of packets. Each packet carries a 3-bit version and a
//! 3-bit type id, and is either a literal number or an operator over nested
//! packets whose children are delimited by a total bit length or a count.
//!
//! Decoding reads exactly one outermost packet; any bits after it are padding.
//! The version sum of every packet is collected while decoding, and
//! [evaluate] reduces the tree to a single value.
//!
//! ## Example
//!
//! ```
//! use packetcraft::{decode_hex, evaluate, PacketKind};
//!
//! let decoded = decode_hex("38006F45291200").unwrap();
//! assert_eq!(decoded.root.kind(), PacketKind::LessThan);
//! assert_eq!(decoded.version_sum, 9);
//! assert_eq!(evaluate(&decoded.root), 1);
//! ```

pub mod bits;
pub mod cursor;
pub mod encode;
pub mod errors;
pub mod eval;
pub mod packet;
pub mod parser;
#[cfg(feature = "serde")]
pub mod serde;

pub use bits::{Bits, hex_char_to_bits};
pub use encode::{Encoder, LengthTypePolicy};
pub use errors::{DecodeError, EncodeError, HexError, Malformation};
pub use eval::{checked_evaluate, evaluate};
pub use packet::{Expr, Packet, PacketKind, Value};
pub use parser::{Decoded, Decoder, DecoderConfig, decode, decode_hex};
