//! Evaluation of a decoded packet tree.
//!
//! | kind         | value                                  |
//! |--------------|----------------------------------------|
//! | literal      | its value                              |
//! | sum          | sum of sub-packets                     |
//! | product      | product of sub-packets                 |
//! | minimum      | smallest sub-packet                    |
//! | maximum      | largest sub-packet                     |
//! | greater than | 1 if first > second, else 0            |
//! | less than    | 1 if first < second, else 0            |
//! | equal to     | 1 if first == second, else 0           |

use crate::packet::{Expr, Operands, Packet, Value};

/// Evaluates `packet`. Sums and products wrap around at 2^128.
pub fn evaluate(packet: &Packet) -> Value {
    match &packet.expr {
        Expr::Literal(value) => *value,
        Expr::Sum(operands) => reduce(operands, Value::wrapping_add),
        Expr::Product(operands) => reduce(operands, Value::wrapping_mul),
        Expr::Minimum(operands) => reduce(operands, Value::min),
        Expr::Maximum(operands) => reduce(operands, Value::max),
        Expr::GreaterThan(pair) => (evaluate(&pair[0]) > evaluate(&pair[1])) as Value,
        Expr::LessThan(pair) => (evaluate(&pair[0]) < evaluate(&pair[1])) as Value,
        Expr::EqualTo(pair) => (evaluate(&pair[0]) == evaluate(&pair[1])) as Value,
    }
}

/// Evaluates `packet`, returning `None` if any sum or product overflows.
pub fn checked_evaluate(packet: &Packet) -> Option<Value> {
    let value = match &packet.expr {
        Expr::Literal(value) => *value,
        Expr::Sum(operands) => try_reduce(operands, Value::checked_add)?,
        Expr::Product(operands) => try_reduce(operands, Value::checked_mul)?,
        Expr::Minimum(operands) => try_reduce(operands, |a, b| Some(a.min(b)))?,
        Expr::Maximum(operands) => try_reduce(operands, |a, b| Some(a.max(b)))?,
        Expr::GreaterThan(pair) => {
            let (first, second) = checked_pair(pair)?;
            (first > second) as Value
        }
        Expr::LessThan(pair) => {
            let (first, second) = checked_pair(pair)?;
            (first < second) as Value
        }
        Expr::EqualTo(pair) => {
            let (first, second) = checked_pair(pair)?;
            (first == second) as Value
        }
    };

    Some(value)
}

fn reduce(operands: &Operands, combine: fn(Value, Value) -> Value) -> Value {
    operands
        .rest()
        .iter()
        .fold(evaluate(operands.first()), |acc, packet| {
            combine(acc, evaluate(packet))
        })
}

fn try_reduce(operands: &Operands, combine: fn(Value, Value) -> Option<Value>) -> Option<Value> {
    operands
        .rest()
        .iter()
        .try_fold(checked_evaluate(operands.first())?, |acc, packet| {
            combine(acc, checked_evaluate(packet)?)
        })
}

fn checked_pair(pair: &[Packet; 2]) -> Option<(Value, Value)> {
    Some((checked_evaluate(&pair[0])?, checked_evaluate(&pair[1])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{packet::PacketKind, parser::decode_hex};

    fn eval_hex(hex: &str) -> Value {
        evaluate(&decode_hex(hex).unwrap().root)
    }

    #[test]
    fn test_examples() {
        let cases = [
            ("C200B40A82", 3),
            ("04005AC33890", 54),
            ("880086C3E88112", 7),
            ("CE00C43D881120", 9),
            ("D8005AC2A8F0", 1),
            ("F600BC2D8F", 0),
            ("9C005AC2F8F0", 0),
            ("9C0141080250320F1802104A08", 1),
            ("38006F45291200", 1),
            ("D2FE28", 2021),
        ];

        for (hex, expected) in cases {
            assert_eq!(eval_hex(hex), expected, "{hex}");
        }
    }

    #[test]
    fn test_nested_equality() {
        let decoded = decode_hex("9C0141080250320F1802104A08").unwrap();
        assert_eq!(decoded.root.to_string(), "eq(sum(1, 3), product(2, 2))");
    }

    #[test]
    fn test_single_operand_aggregates() {
        for kind in [
            PacketKind::Sum,
            PacketKind::Product,
            PacketKind::Minimum,
            PacketKind::Maximum,
        ] {
            let packet = Packet::operator(0, kind, vec![Packet::literal(0, 42)]).unwrap();
            assert_eq!(evaluate(&packet), 42, "{kind:?}");
        }
    }

    #[test]
    fn test_product_beyond_64_bits() {
        let big = Value::from(u64::MAX);
        let packet = Packet::operator(
            0,
            PacketKind::Product,
            vec![Packet::literal(0, big), Packet::literal(0, 4)],
        )
        .unwrap();

        assert_eq!(evaluate(&packet), big * 4);
        assert_eq!(checked_evaluate(&packet), Some(big * 4));
    }

    #[test]
    fn test_overflow() {
        let packet = Packet::operator(
            0,
            PacketKind::Sum,
            vec![Packet::literal(0, Value::MAX), Packet::literal(0, 2)],
        )
        .unwrap();

        assert_eq!(evaluate(&packet), 1);
        assert_eq!(checked_evaluate(&packet), None);
    }

    #[test]
    fn test_comparisons_are_ordered() {
        let compare = |kind: PacketKind, a: Value, b: Value| {
            let packet =
                Packet::operator(0, kind, vec![Packet::literal(0, a), Packet::literal(0, b)])
                    .unwrap();
            evaluate(&packet)
        };

        assert_eq!(compare(PacketKind::GreaterThan, 5, 15), 0);
        assert_eq!(compare(PacketKind::GreaterThan, 15, 5), 1);
        assert_eq!(compare(PacketKind::LessThan, 5, 15), 1);
        assert_eq!(compare(PacketKind::LessThan, 15, 5), 0);
        assert_eq!(compare(PacketKind::EqualTo, 7, 7), 1);
        assert_eq!(compare(PacketKind::EqualTo, 7, 8), 0);
    }
}
