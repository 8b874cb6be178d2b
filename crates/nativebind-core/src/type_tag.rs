//! Deterministic hash-based identity for wrapper types.
//!
//! A [`TypeTag`] is a 64-bit hash computed from the wrapper type's class
//! name. Unlike the sequential IDs some hosts hand out, the hash is stable
//! per type per process and can be computed before the type is registered,
//! so registration order never matters.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// Domain-mixing constants for tag computation.
///
/// Distinct domains guarantee a class tag can never collide with a
/// method-bind key derived from the same name.
pub mod tag_constants {
    /// Domain marker for wrapper type tags.
    pub const TYPE: u64 = 0x7b1f_93d4_5a2e_c806;

    /// Domain marker for class+method bind keys.
    pub const BIND: u64 = 0x2d84_6c1b_f037_95ea;
}

/// An opaque integer identifier for a registered wrapper type.
///
/// The host stores this tag against native instances so the binding layer
/// can recognize which wrapper type (and, through the tag database, which
/// ancestors) back a given instance pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeTag(u64);

impl TypeTag {
    /// Compute the tag for a class name.
    ///
    /// The same name always produces the same tag.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeTag(tag_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// The raw tag value, as handed to the host's `set_type_tag`.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({:#018x})", self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_name() {
        assert_eq!(TypeTag::from_name("Node"), TypeTag::from_name("Node"));
        assert_ne!(TypeTag::from_name("Node"), TypeTag::from_name("Node2D"));
    }

    #[test]
    fn domain_separation() {
        // A type tag is never the plain xxh64 of its name.
        let tag = TypeTag::from_name("Sprite");
        assert_ne!(tag.raw(), xxh64(b"Sprite", 0));
    }
}
