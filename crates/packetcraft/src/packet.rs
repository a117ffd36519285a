//! The decoded packet tree.
//!
//! A [Packet] is a 3-bit version plus an [Expr]. Operator arity is carried by the
//! types: comparisons hold exactly two packets and aggregates hold [Operands],
//! which are never empty.

use std::fmt;

use crate::errors::{DecodeError, Malformation};

/// Integer produced by literals and by evaluation.
pub type Value = u128;

/// The eight packet types, one per 3-bit type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Sum,
    Product,
    Minimum,
    Maximum,
    Literal,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl PacketKind {
    pub const fn type_id(self) -> u8 {
        match self {
            PacketKind::Sum => 0,
            PacketKind::Product => 1,
            PacketKind::Minimum => 2,
            PacketKind::Maximum => 3,
            PacketKind::Literal => 4,
            PacketKind::GreaterThan => 5,
            PacketKind::LessThan => 6,
            PacketKind::EqualTo => 7,
        }
    }

    /// True for the kinds that take exactly two sub-packets.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            PacketKind::GreaterThan | PacketKind::LessThan | PacketKind::EqualTo
        )
    }

    /// Short name used when rendering expressions.
    pub const fn name(self) -> &'static str {
        match self {
            PacketKind::Sum => "sum",
            PacketKind::Product => "product",
            PacketKind::Minimum => "min",
            PacketKind::Maximum => "max",
            PacketKind::Literal => "literal",
            PacketKind::GreaterThan => "gt",
            PacketKind::LessThan => "lt",
            PacketKind::EqualTo => "eq",
        }
    }
}

impl TryFrom<u8> for PacketKind {
    type Error = DecodeError;

    fn try_from(type_id: u8) -> Result<Self, Self::Error> {
        match type_id {
            0 => Ok(PacketKind::Sum),
            1 => Ok(PacketKind::Product),
            2 => Ok(PacketKind::Minimum),
            3 => Ok(PacketKind::Maximum),
            4 => Ok(PacketKind::Literal),
            5 => Ok(PacketKind::GreaterThan),
            6 => Ok(PacketKind::LessThan),
            7 => Ok(PacketKind::EqualTo),
            other => Err(DecodeError::UnknownTypeId(other)),
        }
    }
}

/// One or more sub-packets of a sum, product, minimum or maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operands(Vec<Packet>);

impl Operands {
    /// Returns `None` for an empty list.
    pub fn new(packets: Vec<Packet>) -> Option<Self> {
        if packets.is_empty() {
            None
        } else {
            Some(Operands(packets))
        }
    }

    pub fn first(&self) -> &Packet {
        &self.0[0]
    }

    pub fn rest(&self) -> &[Packet] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[Packet] {
        &self.0
    }
}

/// The payload of a packet, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Value),
    Sum(Operands),
    Product(Operands),
    Minimum(Operands),
    Maximum(Operands),
    GreaterThan(Box<[Packet; 2]>),
    LessThan(Box<[Packet; 2]>),
    EqualTo(Box<[Packet; 2]>),
}

impl Expr {
    /// Builds an operator payload, checking the sub-packet count against the kind.
    pub fn operator(kind: PacketKind, children: Vec<Packet>) -> Result<Self, Malformation> {
        if kind == PacketKind::Literal {
            return Err(Malformation::PayloadMismatch { kind });
        }

        if kind.is_comparison() {
            let count = children.len();
            let pair: Box<[Packet; 2]> = children
                .into_boxed_slice()
                .try_into()
                .map_err(|_| Malformation::ComparisonArity {
                    kind,
                    children: count,
                })?;

            return Ok(match kind {
                PacketKind::GreaterThan => Expr::GreaterThan(pair),
                PacketKind::LessThan => Expr::LessThan(pair),
                _ => Expr::EqualTo(pair),
            });
        }

        let operands = Operands::new(children).ok_or(Malformation::EmptyOperands { kind })?;
        Ok(match kind {
            PacketKind::Sum => Expr::Sum(operands),
            PacketKind::Product => Expr::Product(operands),
            PacketKind::Minimum => Expr::Minimum(operands),
            _ => Expr::Maximum(operands),
        })
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Expr::Literal(_) => PacketKind::Literal,
            Expr::Sum(_) => PacketKind::Sum,
            Expr::Product(_) => PacketKind::Product,
            Expr::Minimum(_) => PacketKind::Minimum,
            Expr::Maximum(_) => PacketKind::Maximum,
            Expr::GreaterThan(_) => PacketKind::GreaterThan,
            Expr::LessThan(_) => PacketKind::LessThan,
            Expr::EqualTo(_) => PacketKind::EqualTo,
        }
    }

    /// Sub-packets in wire order; empty for literals.
    pub fn children(&self) -> &[Packet] {
        match self {
            Expr::Literal(_) => &[],
            Expr::Sum(operands)
            | Expr::Product(operands)
            | Expr::Minimum(operands)
            | Expr::Maximum(operands) => operands.as_slice(),
            Expr::GreaterThan(pair) | Expr::LessThan(pair) | Expr::EqualTo(pair) => {
                pair.as_slice()
            }
        }
    }
}

/// A single packet of a BITS transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// 3-bit version field.
    pub version: u8,
    pub expr: Expr,
}

impl Packet {
    pub fn literal(version: u8, value: Value) -> Self {
        Packet {
            version,
            expr: Expr::Literal(value),
        }
    }

    pub fn operator(
        version: u8,
        kind: PacketKind,
        children: Vec<Packet>,
    ) -> Result<Self, Malformation> {
        Ok(Packet {
            version,
            expr: Expr::operator(kind, children)?,
        })
    }

    pub fn kind(&self) -> PacketKind {
        self.expr.kind()
    }

    pub fn type_id(&self) -> u8 {
        self.kind().type_id()
    }

    /// The literal value, if this is a literal packet.
    pub fn literal_value(&self) -> Option<Value> {
        match self.expr {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Packet] {
        self.expr.children()
    }

    /// Folds every packet of the tree into `init`, parents before children.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &Packet) -> A,
    {
        self.fold_with(init, &mut f)
    }

    fn fold_with<A, F>(&self, acc: A, f: &mut F) -> A
    where
        F: FnMut(A, &Packet) -> A,
    {
        let acc = f(acc, self);
        self.children()
            .iter()
            .fold(acc, |acc, child| child.fold_with(acc, f))
    }

    /// Sum of the version field of this packet and all its descendants.
    pub fn version_sum(&self) -> u64 {
        self.fold(0, |sum, packet| sum + packet.version as u64)
    }

    pub fn packet_count(&self) -> usize {
        self.fold(0, |count, _| count + 1)
    }

    /// Number of packet levels; a lone literal has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Packet::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Expr::Literal(value) = self.expr {
            return write!(f, "{value}");
        }

        write!(f, "{}(", self.kind().name())?;
        for (i, child) in self.children().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}
