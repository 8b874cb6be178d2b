//! Resolved view of the host's function pointer tables.
//!
//! [`HostApi::from_options`] is the only place raw `Option` pointer slots
//! are inspected. It runs once at load time and converts every "null
//! pointer" condition into a typed [`InitError`], so the rest of the crate
//! works with guaranteed-present function pointers. An optional extension
//! that the host does not offer stays unresolved (`None`) — it only becomes
//! an error when a later phase actually needs it.

use core::ffi::{c_char, c_int, c_void};
use std::ffi::CString;
use std::ptr::NonNull;

use tracing::debug;

use nativebind_core::{RegistrationError, TypeTag, Variant};

use crate::abi::{
    ApiVersion, CoreApi, EXT_NATIVESCRIPT, ExtensionHeader, InitOptions, InstanceBindingFunctions,
    InstanceCreateFunc, InstanceDestroyFunc, InstanceMethod, Nativescript11Api, NativescriptApi,
    RawMethodAttributes, RawVariant,
};
use crate::error::{DispatchError, InitError};
use crate::marshal;

/// An opaque resolved handle for one engine class method.
///
/// Obtained once from the host by name and cached; the host guarantees the
/// pointee outlives the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodBind(NonNull<c_void>);

impl MethodBind {
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

// Method binds are immutable host globals; sharing the pointer between
// threads after the write-once init phase is part of the ABI contract.
unsafe impl Send for MethodBind {}
unsafe impl Sync for MethodBind {}

/// The core host table with every required capability resolved.
#[derive(Debug, Clone, Copy)]
pub struct HostApi {
    pub version: ApiVersion,
    library: *mut c_void,
    alloc: unsafe extern "C" fn(usize) -> *mut c_void,
    free: unsafe extern "C" fn(*mut c_void),
    print: unsafe extern "C" fn(*const u8, usize),
    get_singleton: unsafe extern "C" fn(*const c_char) -> *mut c_void,
    get_class_constructor: unsafe extern "C" fn(*const c_char) -> *mut c_void,
    method_bind_get_method: unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_void,
    method_bind_call:
        unsafe extern "C" fn(*mut c_void, *mut c_void, *const RawVariant, c_int) -> RawVariant,
    /// Class/method registration extension, when the host offers it.
    pub nativescript: Option<NativescriptExt>,
}

fn required<T>(slot: Option<T>, name: &'static str) -> Result<T, InitError> {
    slot.ok_or(InitError::MissingCapability(name))
}

fn c_name(name: &str) -> Result<CString, RegistrationError> {
    CString::new(name).map_err(|_| RegistrationError::InvalidName(name.to_owned()))
}

impl HostApi {
    /// Resolve the host tables handed to the plugin's init entry point.
    ///
    /// # Safety
    ///
    /// `options.api`, when non-null, must point to a [`CoreApi`] that stays
    /// valid for the process lifetime, with a well-formed extension list.
    pub unsafe fn from_options(options: &InitOptions) -> Result<Self, InitError> {
        if options.api.is_null() {
            return Err(InitError::NullApiTable);
        }
        if options.library.is_null() {
            return Err(InitError::NullLibraryHandle);
        }
        let api = unsafe { &*options.api };

        let mut nativescript = None;
        if !api.extensions.is_null() {
            for i in 0..api.num_extensions as usize {
                let header = unsafe { *api.extensions.add(i) };
                if header.is_null() {
                    continue;
                }
                if unsafe { (*header).ext_type } == EXT_NATIVESCRIPT {
                    nativescript =
                        Some(unsafe { NativescriptExt::resolve(header.cast::<NativescriptApi>()) }?);
                }
            }
        }

        debug!(
            major = api.version.major,
            minor = api.version.minor,
            nativescript = nativescript.is_some(),
            "resolved host api table"
        );

        Ok(HostApi {
            version: api.version,
            library: options.library,
            alloc: required(api.alloc, "alloc")?,
            free: required(api.free, "free")?,
            print: required(api.print, "print")?,
            get_singleton: required(api.get_singleton, "get_singleton")?,
            get_class_constructor: required(api.get_class_constructor, "get_class_constructor")?,
            method_bind_get_method: required(api.method_bind_get_method, "method_bind_get_method")?,
            method_bind_call: required(api.method_bind_call, "method_bind_call")?,
            nativescript,
        })
    }

    pub fn library(&self) -> *mut c_void {
        self.library
    }

    /// Print a line through the host's output channel.
    pub fn print(&self, message: &str) {
        unsafe { (self.print)(message.as_ptr(), message.len()) }
    }

    /// Copy `bytes` into a host-allocated buffer.
    ///
    /// The host allocator is the process allocator of last resort; like
    /// Rust's own global allocator, failure is not a recoverable condition.
    pub(crate) fn alloc_bytes(&self, bytes: &[u8]) -> crate::abi::RawString {
        if bytes.is_empty() {
            return crate::abi::RawString {
                ptr: core::ptr::null_mut(),
                len: 0,
            };
        }
        let ptr = unsafe { (self.alloc)(bytes.len()) }.cast::<u8>();
        assert!(!ptr.is_null(), "host allocator returned null");
        unsafe { core::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };
        crate::abi::RawString {
            ptr,
            len: bytes.len(),
        }
    }

    pub(crate) fn free_ptr(&self, ptr: *mut c_void) {
        if !ptr.is_null() {
            unsafe { (self.free)(ptr) }
        }
    }

    /// Look up a singleton instance by class name.
    pub fn singleton(&self, name: &str) -> Option<NonNull<c_void>> {
        let name = CString::new(name).ok()?;
        NonNull::new(unsafe { (self.get_singleton)(name.as_ptr()) })
    }

    /// Look up the constructor handle for an instantiable engine class.
    pub fn class_constructor(&self, name: &str) -> Option<NonNull<c_void>> {
        let name = CString::new(name).ok()?;
        NonNull::new(unsafe { (self.get_class_constructor)(name.as_ptr()) })
    }

    /// Ask the host for the native handle of `class.method`.
    ///
    /// `None` means the running host version does not expose the method.
    pub fn method_bind_get(&self, class: &str, method: &str) -> Option<MethodBind> {
        let class = CString::new(class).ok()?;
        let method = CString::new(method).ok()?;
        let ptr = unsafe { (self.method_bind_get_method)(class.as_ptr(), method.as_ptr()) };
        NonNull::new(ptr).map(MethodBind)
    }

    /// Call an engine method through a resolved bind.
    ///
    /// # Safety
    ///
    /// `instance` must be a live native instance of the class the bind was
    /// resolved for (or null for static-style methods, if the host allows).
    pub unsafe fn call_method_bind(
        &self,
        bind: MethodBind,
        instance: *mut c_void,
        args: &[Variant],
    ) -> Result<Variant, DispatchError> {
        let raw_args: Vec<RawVariant> = args.iter().map(|v| marshal::to_raw(self, v)).collect();
        let raw_ret = unsafe {
            (self.method_bind_call)(
                bind.as_ptr(),
                instance,
                raw_args.as_ptr(),
                raw_args.len() as c_int,
            )
        };
        for raw in &raw_args {
            unsafe { marshal::free_raw(self, raw) };
        }
        let ret = unsafe { marshal::from_raw(&raw_ret) };
        unsafe { marshal::free_raw(self, &raw_ret) };
        ret.map_err(DispatchError::UnrepresentableReturn)
    }
}

/// Resolved nativescript extension (class/method registration).
#[derive(Debug, Clone, Copy)]
pub struct NativescriptExt {
    pub version: ApiVersion,
    register_class: unsafe extern "C" fn(
        *mut c_void,
        *const c_char,
        *const c_char,
        InstanceCreateFunc,
        InstanceDestroyFunc,
    ),
    register_method: unsafe extern "C" fn(
        *mut c_void,
        *const c_char,
        *const c_char,
        RawMethodAttributes,
        InstanceMethod,
    ),
    /// The 1.1 sub-extension, when offered.
    pub v11: Option<Nativescript11Ext>,
}

impl NativescriptExt {
    /// # Safety
    ///
    /// `api` must point to a live [`NativescriptApi`] whose `next` chain is
    /// well formed.
    unsafe fn resolve(api: *const NativescriptApi) -> Result<Self, InitError> {
        let api = unsafe { &*api };
        let mut v11 = None;
        let mut cursor = api.next;
        while !cursor.is_null() {
            let header = unsafe { &*cursor };
            if header.version == ApiVersion::new(1, 1) {
                v11 = Some(unsafe { Nativescript11Ext::resolve(cursor.cast()) }?);
            }
            cursor = header.next;
        }
        Ok(NativescriptExt {
            version: api.version,
            register_class: required(api.register_class, "nativescript.register_class")?,
            register_method: required(api.register_method, "nativescript.register_method")?,
            v11,
        })
    }

    /// # Safety
    ///
    /// `handle` must be the nativescript handle the host passed to the
    /// plugin's nativescript init entry point.
    pub unsafe fn register_class(
        &self,
        handle: *mut c_void,
        name: &str,
        base: &str,
        create: InstanceCreateFunc,
        destroy: InstanceDestroyFunc,
    ) -> Result<(), RegistrationError> {
        let name = c_name(name)?;
        let base = c_name(base)?;
        unsafe { (self.register_class)(handle, name.as_ptr(), base.as_ptr(), create, destroy) };
        Ok(())
    }

    /// # Safety
    ///
    /// Same handle requirement as [`NativescriptExt::register_class`].
    pub unsafe fn register_method(
        &self,
        handle: *mut c_void,
        class: &str,
        method: &str,
        attributes: RawMethodAttributes,
        entry: InstanceMethod,
    ) -> Result<(), RegistrationError> {
        let class = c_name(class)?;
        let method = c_name(method)?;
        unsafe {
            (self.register_method)(handle, class.as_ptr(), method.as_ptr(), attributes, entry)
        };
        Ok(())
    }
}

/// Resolved nativescript 1.1 sub-extension.
#[derive(Debug, Clone, Copy)]
pub struct Nativescript11Ext {
    set_type_tag: unsafe extern "C" fn(*mut c_void, *const c_char, *const c_void),
    register_instance_binding_functions: unsafe extern "C" fn(InstanceBindingFunctions) -> c_int,
    unregister_instance_binding_functions: unsafe extern "C" fn(c_int),
    get_instance_binding: unsafe extern "C" fn(c_int, *mut c_void) -> *mut c_void,
    // Optional at call time, not just at resolution: hosts without a
    // profiler leave the slot empty.
    profiling_add_data: Option<unsafe extern "C" fn(*const c_char, u64)>,
}

impl Nativescript11Ext {
    /// # Safety
    ///
    /// `api` must point to a live [`Nativescript11Api`].
    unsafe fn resolve(api: *const Nativescript11Api) -> Result<Self, InitError> {
        let api = unsafe { &*api };
        Ok(Nativescript11Ext {
            set_type_tag: required(api.set_type_tag, "nativescript_1_1.set_type_tag")?,
            register_instance_binding_functions: required(
                api.register_instance_binding_functions,
                "nativescript_1_1.register_instance_binding_functions",
            )?,
            unregister_instance_binding_functions: required(
                api.unregister_instance_binding_functions,
                "nativescript_1_1.unregister_instance_binding_functions",
            )?,
            get_instance_binding: required(
                api.get_instance_binding,
                "nativescript_1_1.get_instance_binding",
            )?,
            profiling_add_data: api.profiling_add_data,
        })
    }

    /// Hand the host the tag it should report for instances of `name`.
    ///
    /// The tag value is leaked into a stable allocation because the host
    /// keeps the pointer for the process lifetime.
    ///
    /// # Safety
    ///
    /// `handle` must be the host's nativescript handle.
    pub unsafe fn set_type_tag(
        &self,
        handle: *mut c_void,
        name: &str,
        tag: TypeTag,
    ) -> Result<(), RegistrationError> {
        let name = c_name(name)?;
        let tag_ptr = Box::into_raw(Box::new(tag.raw())).cast::<c_void>();
        unsafe { (self.set_type_tag)(handle, name.as_ptr(), tag_ptr) };
        Ok(())
    }

    pub fn register_instance_binding(&self, functions: InstanceBindingFunctions) -> c_int {
        unsafe { (self.register_instance_binding_functions)(functions) }
    }

    pub fn unregister_instance_binding(&self, language_index: c_int) {
        unsafe { (self.unregister_instance_binding_functions)(language_index) }
    }

    /// Feed one timing sample into the host profiler.
    ///
    /// `signature` identifies the measured call site; `time_usec` is the
    /// elapsed time in microseconds. Hosts without a profiler leave the
    /// slot empty and the call is a no-op.
    pub fn profiling_add_data(
        &self,
        signature: &str,
        time_usec: u64,
    ) -> Result<(), RegistrationError> {
        if let Some(add_data) = self.profiling_add_data {
            let signature = c_name(signature)?;
            unsafe { add_data(signature.as_ptr(), time_usec) };
        }
        Ok(())
    }

    /// # Safety
    ///
    /// `instance` must be a live native instance pointer.
    pub unsafe fn instance_binding(
        &self,
        language_index: c_int,
        instance: *mut c_void,
    ) -> *mut c_void {
        unsafe { (self.get_instance_binding)(language_index, instance) }
    }
}
