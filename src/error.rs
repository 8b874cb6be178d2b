//! Top-level error surface of the binding context.

use thiserror::Error;

use nativebind_ffi::{DispatchError, InitError, RegistrationError, SchemaError, VariantError};

use crate::context::Phase;

/// A lifecycle entry point was called out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected phase {expected:?}, but the context is in {actual:?}")]
pub struct LifecycleError {
    pub expected: Phase,
    pub actual: Phase,
}

/// Any failure the binding context can surface.
///
/// Each phase-specific error converts transparently, so callers can match
/// on the underlying enums when they care and bubble `ContextError` when
/// they do not.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Variant(#[from] VariantError),
}
