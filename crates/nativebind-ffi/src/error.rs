//! Errors crossing the ABI boundary.
//!
//! [`InitError`] covers everything that can go wrong while resolving the
//! host tables and method binds at load time; all of it is fatal; the
//! plugin must refuse to load rather than run with a partial binding set.
//!
//! [`DispatchError`] covers per-call failures. These are local to one
//! invocation: the caller gets a failure signal, and no process-wide table
//! is touched.

use thiserror::Error;

use nativebind_core::{VariantError, VariantKind};

/// Fatal load-time failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    /// The loader handed us a null core API table.
    #[error("host api table pointer is null")]
    NullApiTable,

    /// The loader handed us a null library handle.
    #[error("host library handle is null")]
    NullLibraryHandle,

    /// A required core table function pointer is absent.
    #[error("host capability '{0}' is unavailable")]
    MissingCapability(&'static str),

    /// An extension required for class registration was never offered.
    #[error("host extension {major}.{minor} is unavailable")]
    MissingExtension { major: u32, minor: u32 },

    /// The host could not resolve a method declared by the schema. The
    /// generated bindings and the running host version disagree.
    #[error("host has no method bind for {class}.{method}")]
    UnresolvedMethodBind { class: String, method: String },

    /// A schema class still has unresolved method binds at the readiness
    /// check.
    #[error("class {class} is missing resolved method binds")]
    IncompleteBindCoverage { class: String },
}

/// Per-call dispatch failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Supplied argument count does not match the declared parameter list.
    #[error("arity mismatch: method declares {expected} parameters, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A positional argument could not be cast to its declared kind.
    #[error("argument {index} ({declared}): {source}")]
    BadArgument {
        index: usize,
        declared: VariantKind,
        source: VariantError,
    },

    /// The instance behind the opaque pointer is not the expected wrapper
    /// type. The tag check caught an invalid reinterpretation.
    #[error("instance is not a '{class}'")]
    InstanceTypeMismatch { class: &'static str },

    /// No method with this name is registered for the class.
    #[error("class '{class}' has no registered method '{method}'")]
    UnknownMethod { class: String, method: String },

    /// The host returned a wire value the variant union cannot represent.
    #[error("method returned an unrepresentable value: {0}")]
    UnrepresentableReturn(#[source] VariantError),
}
