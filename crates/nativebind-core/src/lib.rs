//! Core value model and registries for the nativebind plugin layer.
//!
//! This crate has no ABI surface of its own. It provides:
//! - [`Variant`]: the tagged union value that crosses the host boundary
//! - [`TypeTag`] and [`TagDb`]: wrapper type identity and inheritance relations
//! - Conversion traits ([`FromVariant`], [`IntoVariant`], [`IntoReturn`])
//! - [`Schema`]: the serde model of the engine's class description file
//! - The shared error hierarchy for variants, registration, and schema input

mod convert;
mod error;
mod schema;
mod tag_db;
mod type_tag;
mod variant;
mod vector;

pub use convert::{FromVariant, IntoReturn, IntoVariant, VariantKinded};
pub use error::{RegistrationError, SchemaError, VariantError};
pub use schema::{
    ArgumentDescriptor, ClassDescriptor, EnumDescriptor, MethodDescriptor, PropertyDescriptor,
    Schema,
};
pub use tag_db::TagDb;
pub use type_tag::{TypeTag, tag_constants};
pub use variant::{Variant, VariantKind};
pub use vector::{Color, Vector2, Vector3};

/// Maximum number of declared parameters a dispatchable method may have.
///
/// The dispatch layer enumerates call shapes up to this arity instead of
/// using a fully generic variadic mechanism, so the set of shapes stays
/// closed and exhaustively testable.
pub const MAX_METHOD_ARITY: usize = 8;
