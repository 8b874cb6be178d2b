//! Managed-language binding layer for a native plugin ABI.
//!
//! `nativebind` sits between a game engine host and managed wrapper
//! classes. The host hands the plugin versioned function pointer tables at
//! load time; this crate resolves them, marshals tagged variant values
//! across the boundary, registers wrapper classes and their methods with
//! the host, and dispatches incoming calls into typed Rust methods.
//!
//! The [`Context`] is the entry point: construct it over the engine's
//! class description, drive it through the host lifecycle callbacks, then
//! register classes and methods during the registration window.
//!
//! ```no_run
//! use nativebind::prelude::*;
//!
//! struct Player { health: i64 }
//!
//! impl NativeClass for Player {
//!     const CLASS_NAME: &'static str = "Player";
//!     const BASE_CLASS_NAME: Option<&'static str> = Some("Node");
//!     fn init() -> Self { Player { health: 100 } }
//! }
//!
//! impl Player {
//!     fn heal(&mut self, amount: i64) -> i64 {
//!         self.health += amount;
//!         self.health
//!     }
//! }
//!
//! fn register(ctx: &mut Context) -> Result<(), ContextError> {
//!     unsafe {
//!         ctx.register_class::<Player>()?;
//!         ctx.register_method::<Player, _, _>("heal", MethodFlags::empty(), Player::heal)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;

pub use context::{Context, Phase};
pub use error::{ContextError, LifecycleError};

pub use nativebind_ffi::{
    ClassRegistry, DispatchError, HostApi, InitError, IntoMethodAdapter, MethodAdapter,
    MethodBindTable, NativeClass, abi, instance, marshal,
};
pub use nativebind_ffi::instance::MethodFlags;

pub use nativebind_core::{
    ClassDescriptor, Color, FromVariant, IntoReturn, IntoVariant, MAX_METHOD_ARITY,
    RegistrationError, Schema, SchemaError, TagDb, TypeTag, Variant, VariantError, VariantKind,
    VariantKinded, Vector2, Vector3,
};

/// The commonly needed surface in one import.
pub mod prelude {
    pub use crate::context::{Context, Phase};
    pub use crate::error::{ContextError, LifecycleError};
    pub use nativebind_core::{
        Color, FromVariant, IntoVariant, Schema, TypeTag, Variant, VariantKind, Vector2, Vector3,
    };
    pub use nativebind_ffi::instance::MethodFlags;
    pub use nativebind_ffi::{NativeClass, TagDb};
}
