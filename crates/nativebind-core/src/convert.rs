//! Conversion traits between native values and [`Variant`].
//!
//! - [`FromVariant`]: extract a native value, failing with
//!   [`VariantError::TypeMismatch`] on an incompatible tag
//! - [`IntoVariant`]: wrap a native value into a variant
//! - [`VariantKinded`]: the declared wire tag for a parameter type,
//!   used by dispatch adapters to build their parameter-kind tables
//! - [`IntoReturn`]: return-position conversion, where `()` means
//!   "no value" rather than a nil variant
//!
//! Integer extraction bounds-checks narrowing conversions; an out-of-range
//! value is [`VariantError::IntegerOverflow`], never a silent wrap.

use crate::error::VariantError;
use crate::variant::{Variant, VariantKind};
use crate::vector::{Color, Vector2, Vector3};

/// Extract a native value from a variant.
pub trait FromVariant: Sized {
    fn from_variant(variant: &Variant) -> Result<Self, VariantError>;
}

/// Wrap a native value into a variant.
pub trait IntoVariant {
    fn into_variant(self) -> Variant;
}

/// The wire tag a parameter of this type is declared with.
pub trait VariantKinded {
    const KIND: VariantKind;
}

/// Return-position conversion for dispatched methods.
///
/// `()` produces no variant at all (the "skip" marker of the dispatch
/// protocol); every other supported type wraps itself via [`IntoVariant`].
pub trait IntoReturn {
    /// Whether this return type produces a variant.
    const RETURNS_VALUE: bool;

    fn into_return(self) -> Option<Variant>;
}

impl IntoReturn for () {
    const RETURNS_VALUE: bool = false;

    fn into_return(self) -> Option<Variant> {
        None
    }
}

macro_rules! impl_return_via_variant {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReturn for $ty {
                const RETURNS_VALUE: bool = true;

                fn into_return(self) -> Option<Variant> {
                    Some(self.into_variant())
                }
            }
        )*
    };
}

// === Integers ===
//
// All signed integers share the `Int` wire tag, all unsigned the `Uint`
// tag. Extraction accepts either integer tag with a bounds check, matching
// the cast bridges in `Variant::cast`.

macro_rules! impl_variant_int {
    ($kind:ident, $wire:literal => $($ty:ty),* $(,)?) => {
        $(
            impl VariantKinded for $ty {
                const KIND: VariantKind = VariantKind::$kind;
            }

            impl FromVariant for $ty {
                fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
                    match variant {
                        Variant::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            VariantError::IntegerOverflow {
                                value: *v as i128,
                                target: stringify!($ty),
                            }
                        }),
                        Variant::Uint(v) => <$ty>::try_from(*v).map_err(|_| {
                            VariantError::IntegerOverflow {
                                value: *v as i128,
                                target: stringify!($ty),
                            }
                        }),
                        other => Err(VariantError::TypeMismatch {
                            expected: $wire,
                            actual: other.kind().name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_variant_int!(Int, "int" => i8, i16, i32, i64);
impl_variant_int!(Uint, "uint" => u8, u16, u32, u64);

macro_rules! impl_into_variant_int {
    ($variant:ident, $wide:ty => $($ty:ty),* $(,)?) => {
        $(
            impl IntoVariant for $ty {
                fn into_variant(self) -> Variant {
                    Variant::$variant(self as $wide)
                }
            }
        )*
    };
}

impl_into_variant_int!(Int, i64 => i8, i16, i32, i64);
impl_into_variant_int!(Uint, u64 => u8, u16, u32, u64);
impl_return_via_variant!(i8, i16, i32, i64, u8, u16, u32, u64);

// === Floats ===

impl VariantKinded for f32 {
    const KIND: VariantKind = VariantKind::Float;
}

impl FromVariant for f32 {
    fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
        match variant {
            Variant::Float(v) => Ok(*v as f32),
            other => Err(VariantError::TypeMismatch {
                expected: "float",
                actual: other.kind().name(),
            }),
        }
    }
}

impl IntoVariant for f32 {
    fn into_variant(self) -> Variant {
        Variant::Float(self as f64)
    }
}

impl VariantKinded for f64 {
    const KIND: VariantKind = VariantKind::Float;
}

impl FromVariant for f64 {
    fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
        match variant {
            Variant::Float(v) => Ok(*v),
            other => Err(VariantError::TypeMismatch {
                expected: "float",
                actual: other.kind().name(),
            }),
        }
    }
}

impl IntoVariant for f64 {
    fn into_variant(self) -> Variant {
        Variant::Float(self)
    }
}

impl_return_via_variant!(f32, f64);

// === Bool, strings ===

impl VariantKinded for bool {
    const KIND: VariantKind = VariantKind::Bool;
}

impl FromVariant for bool {
    fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
        match variant {
            Variant::Bool(v) => Ok(*v),
            other => Err(VariantError::TypeMismatch {
                expected: "bool",
                actual: other.kind().name(),
            }),
        }
    }
}

impl IntoVariant for bool {
    fn into_variant(self) -> Variant {
        Variant::Bool(self)
    }
}

impl VariantKinded for String {
    const KIND: VariantKind = VariantKind::Str;
}

impl FromVariant for String {
    fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
        match variant {
            Variant::Str(s) => Ok(s.clone()),
            other => Err(VariantError::TypeMismatch {
                expected: "string",
                actual: other.kind().name(),
            }),
        }
    }
}

impl IntoVariant for String {
    fn into_variant(self) -> Variant {
        Variant::Str(self)
    }
}

impl IntoVariant for &str {
    fn into_variant(self) -> Variant {
        Variant::Str(self.to_owned())
    }
}

impl IntoReturn for &str {
    const RETURNS_VALUE: bool = true;

    fn into_return(self) -> Option<Variant> {
        Some(self.into_variant())
    }
}

impl_return_via_variant!(bool, String);

// === Engine value types ===

macro_rules! impl_variant_value_type {
    ($($kind:ident => $ty:ty),* $(,)?) => {
        $(
            impl VariantKinded for $ty {
                const KIND: VariantKind = VariantKind::$kind;
            }

            impl FromVariant for $ty {
                fn from_variant(variant: &Variant) -> Result<Self, VariantError> {
                    match variant {
                        Variant::$kind(v) => Ok(*v),
                        other => Err(VariantError::TypeMismatch {
                            expected: VariantKind::$kind.name(),
                            actual: other.kind().name(),
                        }),
                    }
                }
            }

            impl IntoVariant for $ty {
                fn into_variant(self) -> Variant {
                    Variant::$kind(self)
                }
            }
        )*
    };
}

impl_variant_value_type!(Vector2 => Vector2, Vector3 => Vector3, Color => Color);
impl_return_via_variant!(Vector2, Vector3, Color);

// A method may hand back a ready-made variant.
impl IntoVariant for Variant {
    fn into_variant(self) -> Variant {
        self
    }
}

impl_return_via_variant!(Variant);
