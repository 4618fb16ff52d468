use serde::{Deserialize, Serialize};

use crate::describe::{paths, Describe, TypeDescriptor, TypeShape};

/// Primitive kinds encoders dispatch on.
///
/// `Complex` is the fallback for anything without a native encoding (records,
/// containers, options). `Empty` stands for "no type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Empty,
    Boolean,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    DateTime,
    String,
    Complex,
}

/// Ordered identity table; first match wins.
const WELL_KNOWN: &[(&str, PrimitiveKind)] = &[
    (paths::BOOL, PrimitiveKind::Boolean),
    (paths::CHAR, PrimitiveKind::Char),
    (paths::I8, PrimitiveKind::Int8),
    (paths::U8, PrimitiveKind::UInt8),
    (paths::I16, PrimitiveKind::Int16),
    (paths::U16, PrimitiveKind::UInt16),
    (paths::I32, PrimitiveKind::Int32),
    (paths::U32, PrimitiveKind::UInt32),
    (paths::I64, PrimitiveKind::Int64),
    (paths::U64, PrimitiveKind::UInt64),
    (paths::F32, PrimitiveKind::Float32),
    (paths::F64, PrimitiveKind::Float64),
    (paths::DECIMAL, PrimitiveKind::Decimal),
    (paths::DATE_TIME_UTC, PrimitiveKind::DateTime),
    (paths::NAIVE_DATE_TIME, PrimitiveKind::DateTime),
    (paths::STRING, PrimitiveKind::String),
    (paths::STR, PrimitiveKind::String),
];

/// Classifies a type into its primitive kind.
///
/// `None` yields `Empty`. The well-known table is consulted first, whatever
/// the shape; an enum that matches nothing classifies as its underlying
/// integer type. Anything else yields `Complex`.
pub fn classify(ty: Option<&TypeDescriptor>) -> PrimitiveKind {
    let Some(ty) = ty else {
        return PrimitiveKind::Empty;
    };

    if let Some((_, kind)) = WELL_KNOWN.iter().find(|(path, _)| *path == ty.path()) {
        return *kind;
    }

    match ty.shape() {
        TypeShape::Enum { underlying } => classify(Some(underlying)),
        TypeShape::Plain => PrimitiveKind::Complex,
    }
}

impl PrimitiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::Empty,
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
        PrimitiveKind::Decimal,
        PrimitiveKind::DateTime,
        PrimitiveKind::String,
        PrimitiveKind::Complex,
    ];

    /// Classifies `T` through its `Describe` implementation.
    pub fn of<T: Describe + ?Sized>() -> Self {
        classify(Some(&T::descriptor()))
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::UInt8
                | PrimitiveKind::Int16
                | PrimitiveKind::UInt16
                | PrimitiveKind::Int32
                | PrimitiveKind::UInt32
                | PrimitiveKind::Int64
                | PrimitiveKind::UInt64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                PrimitiveKind::Float32 | PrimitiveKind::Float64 | PrimitiveKind::Decimal
            )
    }

    /// True for every kind with a native encoding.
    pub fn is_primitive(self) -> bool {
        !matches!(self, PrimitiveKind::Empty | PrimitiveKind::Complex)
    }
}
