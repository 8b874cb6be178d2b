//! `extern "C"` trampolines that carry host calls into managed instances.
//!
//! When a class is registered the host receives three function pointers per
//! instance lifecycle: a constructor, a destructor, and one entry point per
//! method. The constructor boxes a fresh `T` and hands the host the raw
//! pointer as `user_data`; every later call gets that pointer back. The
//! method trampoline owns a leaked [`MethodTrampolineData`] as its
//! `method_data`, pairing the dispatch adapter with the host table needed
//! to marshal the result.
//!
//! Nothing here may unwind into the host or return a poisoned variant: any
//! failure is logged and collapses to a nil wire variant.

use core::ffi::{c_int, c_void};

use bitflags::bitflags;
use tracing::warn;

use crate::abi::{
    InstanceCreateFunc, InstanceDestroyFunc, InstanceMethod, RawMethodAttributes, RawVariant,
};
use crate::dispatch::{MethodAdapter, NativeClass};
use crate::host::HostApi;
use crate::marshal;

bitflags! {
    /// RPC attributes attached to a registered method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MethodFlags: u32 {
        const RPC_REMOTE = 1;
        const RPC_MASTER = 1 << 1;
        const RPC_PUPPET = 1 << 2;
        const RPC_SYNC = 1 << 3;
    }
}

impl MethodFlags {
    pub fn to_raw(self) -> RawMethodAttributes {
        RawMethodAttributes {
            rpc_type: self.bits(),
        }
    }
}

/// Per-method state owned by the host for the registration's lifetime.
///
/// Boxed and leaked at registration; the host frees it through
/// [`free_trampoline_data`] when the method is torn down.
pub struct MethodTrampolineData {
    pub adapter: MethodAdapter,
    pub host: HostApi,
}

unsafe extern "C" fn create_instance<T: NativeClass>(
    _native: *mut c_void,
    _method_data: *mut c_void,
) -> *mut c_void {
    Box::into_raw(Box::new(T::init())).cast::<c_void>()
}

unsafe extern "C" fn destroy_instance<T: NativeClass>(
    _native: *mut c_void,
    _method_data: *mut c_void,
    user_data: *mut c_void,
) {
    if !user_data.is_null() {
        drop(unsafe { Box::from_raw(user_data.cast::<T>()) });
    }
}

unsafe extern "C" fn method_trampoline<T: NativeClass>(
    _native: *mut c_void,
    method_data: *mut c_void,
    user_data: *mut c_void,
    num_args: c_int,
    args: *const RawVariant,
) -> RawVariant {
    if method_data.is_null() || user_data.is_null() {
        warn!(class = T::CLASS_NAME, "method call with null state pointer");
        return RawVariant::nil();
    }
    let data = unsafe { &*method_data.cast::<MethodTrampolineData>() };
    let instance = unsafe { &mut *user_data.cast::<T>() };

    let args = match unsafe { marshal::collect_args(args, num_args) } {
        Ok(args) => args,
        Err(error) => {
            warn!(class = T::CLASS_NAME, %error, "undecodable method arguments");
            return RawVariant::nil();
        }
    };

    match data.adapter.invoke(instance, &args) {
        Ok(Some(value)) => marshal::to_raw(&data.host, &value),
        Ok(None) => RawVariant::nil(),
        Err(error) => {
            warn!(class = T::CLASS_NAME, %error, "method dispatch failed");
            RawVariant::nil()
        }
    }
}

unsafe extern "C" fn free_trampoline_data(data: *mut c_void) {
    if !data.is_null() {
        drop(unsafe { Box::from_raw(data.cast::<MethodTrampolineData>()) });
    }
}

/// Constructor registration record for `T`.
pub fn create_func<T: NativeClass>() -> InstanceCreateFunc {
    InstanceCreateFunc {
        create: Some(create_instance::<T>),
        method_data: core::ptr::null_mut(),
        free_method_data: None,
    }
}

/// Destructor registration record for `T`.
pub fn destroy_func<T: NativeClass>() -> InstanceDestroyFunc {
    InstanceDestroyFunc {
        destroy: Some(destroy_instance::<T>),
        method_data: core::ptr::null_mut(),
        free_method_data: None,
    }
}

/// Method registration record binding `adapter` to the trampoline for `T`.
pub fn method_func<T: NativeClass>(adapter: MethodAdapter, host: HostApi) -> InstanceMethod {
    let data = Box::new(MethodTrampolineData { adapter, host });
    InstanceMethod {
        method: Some(method_trampoline::<T>),
        method_data: Box::into_raw(data).cast::<c_void>(),
        free_method_data: Some(free_trampoline_data),
    }
}
