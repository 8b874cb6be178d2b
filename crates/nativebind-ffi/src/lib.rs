//! ABI boundary of the nativebind plugin layer.
//!
//! This crate owns everything that touches raw host memory:
//! - `abi`: hand-written `repr(C)` definitions of the host's function
//!   pointer tables, extension headers, and the wire form of variants
//! - [`HostApi`]: fallible resolution of those tables into non-optional
//!   function pointers at load time
//! - `marshal`: copies between owned [`Variant`]s and wire variants
//! - [`MethodBindTable`]: per-class cache of resolved native method handles
//! - [`MethodAdapter`] / [`ClassRegistry`]: reflective dispatch from
//!   untyped argument arrays into typed managed methods
//! - `instance`: the `extern "C"` trampolines handed to the host
//!
//! [`Variant`]: nativebind_core::Variant

pub mod abi;

mod error;
pub use error::{DispatchError, InitError};

mod host;
pub use host::{HostApi, MethodBind, NativescriptExt, Nativescript11Ext};

pub mod marshal;

mod bindings;
pub use bindings::{BindKey, MethodBindTable};

mod dispatch;
pub use dispatch::{ClassEntry, ClassRegistry, IntoMethodAdapter, MethodAdapter, NativeClass};

pub mod instance;
pub use instance::{MethodFlags, MethodTrampolineData};

#[cfg(test)]
pub(crate) mod test_host;

// Re-export the core surface so dependents need only this crate.
pub use nativebind_core::{
    ClassDescriptor, Color, FromVariant, IntoReturn, IntoVariant, MAX_METHOD_ARITY,
    RegistrationError, Schema, SchemaError, TagDb, TypeTag, Variant, VariantError, VariantKind,
    VariantKinded, Vector2, Vector3,
};
