//! Writing a [Packet] tree back to its wire form.

use crate::{
    bits::Bits,
    errors::EncodeError,
    packet::{Expr, Packet, Value},
    parser::{LengthType, SUB_PACKET_COUNT_BITS, TOTAL_LENGTH_BITS},
};

const MAX_VERSION: u8 = 0b111;

/// Which length type the encoder writes for operator packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthTypePolicy {
    /// Always declare the total bit length of the sub-packets.
    #[default]
    TotalBits,
    /// Always declare the number of sub-packets.
    SubPacketCount,
    /// Total bit length at the outermost level, then alternate with each nesting level.
    Alternate,
}

impl LengthTypePolicy {
    fn at_depth(self, depth: usize) -> LengthType {
        match self {
            LengthTypePolicy::TotalBits => LengthType::TotalBits,
            LengthTypePolicy::SubPacketCount => LengthType::SubPacketCount,
            LengthTypePolicy::Alternate if depth % 2 == 0 => LengthType::TotalBits,
            LengthTypePolicy::Alternate => LengthType::SubPacketCount,
        }
    }
}

/// Encodes packets without trailing padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    policy: LengthTypePolicy,
}

impl Encoder {
    pub fn new(policy: LengthTypePolicy) -> Self {
        Self { policy }
    }

    pub fn encode(&self, packet: &Packet) -> Result<Bits, EncodeError> {
        let mut out = Bits::new();
        self.write(packet, 0, &mut out)?;
        Ok(out)
    }

    fn write(&self, packet: &Packet, depth: usize, out: &mut Bits) -> Result<(), EncodeError> {
        if packet.version > MAX_VERSION {
            return Err(EncodeError::VersionOutOfRange(packet.version));
        }

        out.push_bits(packet.version as u64, 3);
        out.push_bits(packet.type_id() as u64, 3);

        if let Expr::Literal(value) = packet.expr {
            write_literal(value, out);
            return Ok(());
        }

        let children = packet.children();
        match self.policy.at_depth(depth) {
            LengthType::TotalBits => {
                let mut body = Bits::new();
                for child in children {
                    self.write(child, depth + 1, &mut body)?;
                }

                if body.len() >= 1 << TOTAL_LENGTH_BITS {
                    return Err(EncodeError::SubPacketBitsOverflow(body.len()));
                }

                out.push(false);
                out.push_bits(body.len() as u64, TOTAL_LENGTH_BITS);
                out.extend_from_bits(&body);
            }
            LengthType::SubPacketCount => {
                if children.len() >= 1 << SUB_PACKET_COUNT_BITS {
                    return Err(EncodeError::SubPacketCountOverflow(children.len()));
                }

                out.push(true);
                out.push_bits(children.len() as u64, SUB_PACKET_COUNT_BITS);
                for child in children {
                    self.write(child, depth + 1, out)?;
                }
            }
        }

        Ok(())
    }
}

/// Writes the fewest 5-bit groups that hold `value`; zero takes one group.
fn write_literal(value: Value, out: &mut Bits) {
    let significant = (Value::BITS - value.leading_zeros()) as usize;
    let groups = significant.div_ceil(4).max(1);

    for group in (0..groups).rev() {
        out.push(group > 0);
        out.push_bits(((value >> (4 * group)) & 0xF) as u64, 4);
    }
}
