//! The tagged union value crossing the host boundary.
//!
//! A [`Variant`] holds exactly one of a closed set of value types. It is the
//! universal currency between the managed side and the host engine: method
//! arguments arrive as variants and results leave as variants. Conversion
//! between tags is explicit and fallible — a mismatched extraction is a
//! [`VariantError::TypeMismatch`], never a reinterpretation of storage.
//!
//! Variants are value-typed: a string-backed variant owns its buffer and
//! releases it on drop; equality is by tag plus value.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::VariantError;
use crate::vector::{Color, Vector2, Vector3};

/// The active tag of a [`Variant`].
///
/// The discriminants are the wire encoding: a raw variant carries this value
/// as a `u32`, so the numbering is part of the plugin ABI and must not be
/// reordered.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum VariantKind {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Uint = 3,
    Float = 4,
    Str = 5,
    Vector2 = 6,
    Vector3 = 7,
    Color = 8,
}

impl VariantKind {
    /// Human-readable tag name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            VariantKind::Nil => "nil",
            VariantKind::Bool => "bool",
            VariantKind::Int => "int",
            VariantKind::Uint => "uint",
            VariantKind::Float => "float",
            VariantKind::Str => "string",
            VariantKind::Vector2 => "Vector2",
            VariantKind::Vector3 => "Vector3",
            VariantKind::Color => "Color",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A value with exactly one active tag out of the closed set supported by
/// the plugin ABI.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Color(Color),
}

impl Variant {
    /// Construct a variant from any supported native value.
    pub fn from<T: crate::IntoVariant>(value: T) -> Self {
        value.into_variant()
    }

    /// The active tag.
    pub const fn kind(&self) -> VariantKind {
        match self {
            Variant::Nil => VariantKind::Nil,
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Int(_) => VariantKind::Int,
            Variant::Uint(_) => VariantKind::Uint,
            Variant::Float(_) => VariantKind::Float,
            Variant::Str(_) => VariantKind::Str,
            Variant::Vector2(_) => VariantKind::Vector2,
            Variant::Vector3(_) => VariantKind::Vector3,
            Variant::Color(_) => VariantKind::Color,
        }
    }

    pub const fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    /// Dynamically convert this variant to the requested tag.
    ///
    /// Same-tag casts copy the value. The only cross-tag bridges are the
    /// ones the wire protocol needs: `Int`/`Uint` into each other when the
    /// value fits, and `Int`/`Uint` into `Float`. Everything else fails with
    /// [`VariantError::TypeMismatch`]; an out-of-range integer bridge fails
    /// with [`VariantError::IntegerOverflow`].
    pub fn cast(&self, target: VariantKind) -> Result<Variant, VariantError> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        match (self, target) {
            (Variant::Int(v), VariantKind::Uint) => u64::try_from(*v)
                .map(Variant::Uint)
                .map_err(|_| VariantError::IntegerOverflow {
                    value: *v as i128,
                    target: "uint",
                }),
            (Variant::Uint(v), VariantKind::Int) => i64::try_from(*v)
                .map(Variant::Int)
                .map_err(|_| VariantError::IntegerOverflow {
                    value: *v as i128,
                    target: "int",
                }),
            (Variant::Int(v), VariantKind::Float) => Ok(Variant::Float(*v as f64)),
            (Variant::Uint(v), VariantKind::Float) => Ok(Variant::Float(*v as f64)),
            _ => Err(VariantError::TypeMismatch {
                expected: target.name(),
                actual: self.kind().name(),
            }),
        }
    }

    /// Typed extraction, the static counterpart of [`Variant::cast`].
    pub fn to<T: crate::FromVariant>(&self) -> Result<T, VariantError> {
        T::from_variant(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_active_tag() {
        assert_eq!(Variant::Nil.kind(), VariantKind::Nil);
        assert_eq!(Variant::Bool(true).kind(), VariantKind::Bool);
        assert_eq!(Variant::Int(-3).kind(), VariantKind::Int);
        assert_eq!(Variant::Uint(3).kind(), VariantKind::Uint);
        assert_eq!(Variant::Float(1.5).kind(), VariantKind::Float);
        assert_eq!(Variant::Str("x".into()).kind(), VariantKind::Str);
        assert_eq!(Variant::Vector2(Vector2::new(1.0, 2.0)).kind(), VariantKind::Vector2);
    }

    #[test]
    fn same_kind_cast_is_identity() {
        let v = Variant::Str("hello".into());
        assert_eq!(v.cast(VariantKind::Str).unwrap(), v);
    }

    #[test]
    fn int_bridges() {
        assert_eq!(
            Variant::Int(7).cast(VariantKind::Uint).unwrap(),
            Variant::Uint(7)
        );
        assert_eq!(
            Variant::Uint(7).cast(VariantKind::Int).unwrap(),
            Variant::Int(7)
        );
        assert_eq!(
            Variant::Int(2).cast(VariantKind::Float).unwrap(),
            Variant::Float(2.0)
        );
    }

    #[test]
    fn negative_int_does_not_fit_uint() {
        let err = Variant::Int(-1).cast(VariantKind::Uint).unwrap_err();
        assert!(matches!(err, VariantError::IntegerOverflow { .. }));
    }

    #[test]
    fn huge_uint_does_not_fit_int() {
        let err = Variant::Uint(u64::MAX).cast(VariantKind::Int).unwrap_err();
        assert!(matches!(err, VariantError::IntegerOverflow { .. }));
    }

    #[test]
    fn incompatible_cast_is_type_mismatch() {
        let err = Variant::Str("bad".into())
            .cast(VariantKind::Float)
            .unwrap_err();
        assert_eq!(
            err,
            VariantError::TypeMismatch {
                expected: "float",
                actual: "string",
            }
        );
    }

    #[test]
    fn float_never_silently_truncates_to_int() {
        assert!(Variant::Float(3.5).cast(VariantKind::Int).is_err());
    }

    #[test]
    fn kind_wire_roundtrip() {
        for kind in [
            VariantKind::Nil,
            VariantKind::Bool,
            VariantKind::Int,
            VariantKind::Uint,
            VariantKind::Float,
            VariantKind::Str,
            VariantKind::Vector2,
            VariantKind::Vector3,
            VariantKind::Color,
        ] {
            let raw: u32 = kind.into();
            assert_eq!(VariantKind::try_from(raw).unwrap(), kind);
        }
        assert!(VariantKind::try_from(99u32).is_err());
    }
}
