//! Raw `repr(C)` definitions of the host plugin ABI.
//!
//! The host hands the plugin one versioned table of function pointers
//! ([`CoreApi`]) at load time, with optional capability extensions chained
//! behind it as a linked list of [`ExtensionHeader`]s. Every pointer slot is
//! an `Option<unsafe extern "C" fn>` so an absent capability is a plain
//! `None`, not undefined behavior; resolution into guaranteed-present
//! pointers happens once in [`HostApi`](crate::HostApi).
//!
//! Nothing in this module calls anything; it is layout only.

use core::ffi::{c_char, c_int, c_void};

use nativebind_core::{Color, Vector2, Vector3};

/// ABI version carried by the core table and every extension header.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Extension discriminator for the nativescript extension.
pub const EXT_NATIVESCRIPT: u32 = 1;

/// Header shared by every entry in the extension linked list.
///
/// A concrete extension struct starts with these same three fields, so a
/// header whose `ext_type` matches may be reinterpreted as that extension.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExtensionHeader {
    pub ext_type: u32,
    pub version: ApiVersion,
    pub next: *const ExtensionHeader,
}

// === Wire variants ===

/// Borrowed/owned raw string payload. `ptr` is not NUL-terminated; `len`
/// is the byte length. Buffers leaving the plugin are allocated with the
/// host allocator so the host's variant destructor can free them.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawString {
    pub ptr: *mut u8,
    pub len: usize,
}

/// Payload of a wire variant. Which field is live is decided solely by
/// [`RawVariant::kind`].
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawVariantData {
    pub boolean: bool,
    pub int: i64,
    pub uint: u64,
    pub float: f64,
    pub string: RawString,
    pub vector2: Vector2,
    pub vector3: Vector3,
    pub color: Color,
}

/// The wire form of a variant: a `u32` tag (the discriminants of
/// [`VariantKind`](nativebind_core::VariantKind)) plus an untagged payload.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawVariant {
    pub kind: u32,
    pub data: RawVariantData,
}

impl RawVariant {
    /// A nil wire variant with zeroed payload.
    pub const fn nil() -> Self {
        RawVariant {
            kind: 0,
            data: RawVariantData { int: 0 },
        }
    }
}

// === Core table function pointer types ===

pub type AllocFn = Option<unsafe extern "C" fn(size: usize) -> *mut c_void>;
pub type FreeFn = Option<unsafe extern "C" fn(ptr: *mut c_void)>;
pub type PrintFn = Option<unsafe extern "C" fn(msg: *const u8, len: usize)>;
pub type GetSingletonFn = Option<unsafe extern "C" fn(name: *const c_char) -> *mut c_void>;
pub type GetClassConstructorFn = Option<unsafe extern "C" fn(name: *const c_char) -> *mut c_void>;
pub type MethodBindGetFn =
    Option<unsafe extern "C" fn(class: *const c_char, method: *const c_char) -> *mut c_void>;
pub type MethodBindCallFn = Option<
    unsafe extern "C" fn(
        bind: *mut c_void,
        instance: *mut c_void,
        args: *const RawVariant,
        num_args: c_int,
    ) -> RawVariant,
>;

/// The host's core function pointer table, valid for the process lifetime.
#[repr(C)]
pub struct CoreApi {
    pub version: ApiVersion,
    pub extensions: *const *const ExtensionHeader,
    pub num_extensions: u32,
    pub alloc: AllocFn,
    pub free: FreeFn,
    pub print: PrintFn,
    pub get_singleton: GetSingletonFn,
    pub get_class_constructor: GetClassConstructorFn,
    pub method_bind_get_method: MethodBindGetFn,
    pub method_bind_call: MethodBindCallFn,
}

// === Instance trampoline types ===

/// Builds the managed-side state for a freshly constructed native instance.
/// The returned pointer becomes `user_data` for later method calls.
pub type CreateFn =
    Option<unsafe extern "C" fn(native: *mut c_void, method_data: *mut c_void) -> *mut c_void>;

/// Tears down the managed-side state created by [`CreateFn`].
pub type DestroyFn = Option<
    unsafe extern "C" fn(native: *mut c_void, method_data: *mut c_void, user_data: *mut c_void),
>;

/// A registered method entry point. `num_args <= 0` means "no arguments";
/// the dispatch layer normalizes both encodings to the empty slice.
pub type MethodFn = Option<
    unsafe extern "C" fn(
        native: *mut c_void,
        method_data: *mut c_void,
        user_data: *mut c_void,
        num_args: c_int,
        args: *const RawVariant,
    ) -> RawVariant,
>;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct InstanceCreateFunc {
    pub create: CreateFn,
    pub method_data: *mut c_void,
    pub free_method_data: FreeFn,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct InstanceDestroyFunc {
    pub destroy: DestroyFn,
    pub method_data: *mut c_void,
    pub free_method_data: FreeFn,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct InstanceMethod {
    pub method: MethodFn,
    pub method_data: *mut c_void,
    pub free_method_data: FreeFn,
}

/// Method attributes as they cross the ABI. The `rpc_type` bits are the
/// [`MethodFlags`](crate::MethodFlags) representation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMethodAttributes {
    pub rpc_type: u32,
}

/// Instance binding data callbacks registered per scripting language.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InstanceBindingFunctions {
    pub alloc_binding_data:
        Option<unsafe extern "C" fn(language_index: c_int, instance: *mut c_void) -> *mut c_void>,
    pub free_binding_data: Option<
        unsafe extern "C" fn(language_index: c_int, instance: *mut c_void, binding: *mut c_void),
    >,
    pub data: *mut c_void,
}

impl Default for InstanceBindingFunctions {
    fn default() -> Self {
        Self {
            alloc_binding_data: None,
            free_binding_data: None,
            data: core::ptr::null_mut(),
        }
    }
}

// === Nativescript extension (class/method registration) ===

pub type RegisterClassFn = Option<
    unsafe extern "C" fn(
        handle: *mut c_void,
        name: *const c_char,
        base: *const c_char,
        create: InstanceCreateFunc,
        destroy: InstanceDestroyFunc,
    ),
>;
pub type RegisterMethodFn = Option<
    unsafe extern "C" fn(
        handle: *mut c_void,
        class_name: *const c_char,
        method_name: *const c_char,
        attributes: RawMethodAttributes,
        method: InstanceMethod,
    ),
>;

/// The nativescript extension table (version 1.0). Begins with the
/// [`ExtensionHeader`] fields.
#[repr(C)]
pub struct NativescriptApi {
    pub ext_type: u32,
    pub version: ApiVersion,
    pub next: *const ExtensionHeader,
    pub register_class: RegisterClassFn,
    pub register_method: RegisterMethodFn,
}

pub type SetTypeTagFn =
    Option<unsafe extern "C" fn(handle: *mut c_void, name: *const c_char, tag: *const c_void)>;
pub type RegisterInstanceBindingFn =
    Option<unsafe extern "C" fn(functions: InstanceBindingFunctions) -> c_int>;
pub type UnregisterInstanceBindingFn = Option<unsafe extern "C" fn(language_index: c_int)>;
pub type GetInstanceBindingFn =
    Option<unsafe extern "C" fn(language_index: c_int, instance: *mut c_void) -> *mut c_void>;
pub type ProfilingAddDataFn =
    Option<unsafe extern "C" fn(signature: *const c_char, time_usec: u64)>;

/// The nativescript 1.1 sub-extension, chained behind [`NativescriptApi`]
/// via its `next` pointer. Adds type tagging, instance binding data, and a
/// profiling feed.
#[repr(C)]
pub struct Nativescript11Api {
    pub ext_type: u32,
    pub version: ApiVersion,
    pub next: *const ExtensionHeader,
    pub set_type_tag: SetTypeTagFn,
    pub register_instance_binding_functions: RegisterInstanceBindingFn,
    pub unregister_instance_binding_functions: UnregisterInstanceBindingFn,
    pub get_instance_binding: GetInstanceBindingFn,
    pub profiling_add_data: ProfilingAddDataFn,
}

// === Entry point option structs ===

/// Passed to the plugin's init entry point by the host loader.
#[repr(C)]
pub struct InitOptions {
    pub api: *const CoreApi,
    pub library: *mut c_void,
    pub in_editor: bool,
}

/// Passed to the plugin's terminate entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TerminateOptions {
    pub in_editor: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_header_prefixes_extension_structs() {
        // The reinterpret in the extension walk relies on the header fields
        // leading both extension structs.
        assert_eq!(
            core::mem::offset_of!(NativescriptApi, ext_type),
            core::mem::offset_of!(ExtensionHeader, ext_type)
        );
        assert_eq!(
            core::mem::offset_of!(NativescriptApi, version),
            core::mem::offset_of!(ExtensionHeader, version)
        );
        assert_eq!(
            core::mem::offset_of!(Nativescript11Api, next),
            core::mem::offset_of!(ExtensionHeader, next)
        );
    }

    #[test]
    fn nil_raw_variant_is_tag_zero() {
        let raw = RawVariant::nil();
        assert_eq!(raw.kind, 0);
    }
}
