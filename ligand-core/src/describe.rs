use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical paths of the well-known types the classifier recognizes.
pub(crate) mod paths {
    pub const BOOL: &str = "bool";
    pub const CHAR: &str = "char";
    pub const I8: &str = "i8";
    pub const U8: &str = "u8";
    pub const I16: &str = "i16";
    pub const U16: &str = "u16";
    pub const I32: &str = "i32";
    pub const U32: &str = "u32";
    pub const I64: &str = "i64";
    pub const U64: &str = "u64";
    pub const F32: &str = "f32";
    pub const F64: &str = "f64";
    pub const DECIMAL: &str = "rust_decimal::Decimal";
    pub const DATE_TIME_UTC: &str = "chrono::DateTime<Utc>";
    pub const NAIVE_DATE_TIME: &str = "chrono::NaiveDateTime";
    pub const STRING: &str = "String";
    pub const STR: &str = "str";
}

/// Identity of a type as seen by the mapping layer.
///
/// Two descriptors denote the same type when their paths and shapes are equal.
/// Paths of well-known types are fixed literals; derived types use
/// `module_path!()::Ident`; generic containers compose the paths of their
/// parameters (`Vec<i32>`, `Option<String>`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    path: Cow<'static, str>,
    shape: TypeShape,
}

/// Structural shape of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeShape {
    /// Any non-enum type.
    Plain,
    /// Fieldless enum stored as its integer representation.
    Enum { underlying: Box<TypeDescriptor> },
}

impl TypeDescriptor {
    /// Creates a plain descriptor for the given path.
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        TypeDescriptor {
            path: path.into(),
            shape: TypeShape::Plain,
        }
    }

    /// Creates an enum descriptor backed by `underlying`.
    pub fn enumeration(path: impl Into<Cow<'static, str>>, underlying: TypeDescriptor) -> Self {
        TypeDescriptor {
            path: path.into(),
            shape: TypeShape::Enum {
                underlying: Box::new(underlying),
            },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.shape, TypeShape::Enum { .. })
    }

    /// Returns the integer representation of an enum, or `None` for plain types.
    pub fn underlying(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            TypeShape::Enum { underlying } => Some(underlying),
            TypeShape::Plain => None,
        }
    }
}

/// Types that can report their `TypeDescriptor`.
///
/// Implemented here for primitives, strings, decimals, date-times and the
/// common containers. Use `#[derive(Describe)]` or `#[derive(Document)]`
/// for your own types.
pub trait Describe {
    fn descriptor() -> TypeDescriptor;
}

macro_rules! describe_well_known {
    ($($ty:ty => $path:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new($path)
                }
            }
        )*
    };
}

describe_well_known! {
    bool => paths::BOOL,
    char => paths::CHAR,
    i8 => paths::I8,
    u8 => paths::U8,
    i16 => paths::I16,
    u16 => paths::U16,
    i32 => paths::I32,
    u32 => paths::U32,
    i64 => paths::I64,
    u64 => paths::U64,
    f32 => paths::F32,
    f64 => paths::F64,
    Decimal => paths::DECIMAL,
    DateTime<Utc> => paths::DATE_TIME_UTC,
    NaiveDateTime => paths::NAIVE_DATE_TIME,
    String => paths::STRING,
    str => paths::STR,
    () => "()",
    // No fixed-width encoding; these classify as Complex.
    usize => "usize",
    isize => "isize",
    u128 => "u128",
    i128 => "i128",
}

// Pointers describe as their pointee.
macro_rules! describe_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ptr<T> {
                fn descriptor() -> TypeDescriptor {
                    T::descriptor()
                }
            }
        )*
    };
}

describe_pointer!(Box, Arc, Rc);

impl<T: Describe + ?Sized> Describe for &T {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

macro_rules! describe_sequence {
    ($($container:ident),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $container<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new(format!(
                        concat!(stringify!($container), "<{}>"),
                        T::descriptor().path()
                    ))
                }
            }
        )*
    };
}

describe_sequence!(Option, Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!("HashSet<{}>", T::descriptor().path()))
    }
}

impl<T: Describe> Describe for [T] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!("[{}]", T::descriptor().path()))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!("[{}; {}]", T::descriptor().path(), N))
    }
}

macro_rules! describe_tuple {
    ($(($($name:ident),+)),* $(,)?) => {
        $(
            impl<$($name: Describe),+> Describe for ($($name,)+) {
                fn descriptor() -> TypeDescriptor {
                    let parts: Vec<String> = vec![$($name::descriptor().path().to_string()),+];
                    TypeDescriptor::new(format!("({})", parts.join(", ")))
                }
            }
        )*
    };
}

describe_tuple! {
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!(
            "HashMap<{}, {}>",
            K::descriptor().path(),
            V::descriptor().path()
        ))
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!(
            "BTreeMap<{}, {}>",
            K::descriptor().path(),
            V::descriptor().path()
        ))
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(format!(
            "IndexMap<{}, {}>",
            K::descriptor().path(),
            V::descriptor().path()
        ))
    }
}
