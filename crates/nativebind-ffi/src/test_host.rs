//! Minimal in-process host used by this crate's unit tests.
//!
//! Provides a core table whose allocator is the Rust global allocator with
//! a size header, and whose lookups return sentinel handles. Integration
//! tests at the workspace root build a richer mock with registration
//! capture; this one only needs to satisfy marshalling and bind resolution.

use core::ffi::{c_char, c_int, c_void};
use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;

use crate::abi::{ApiVersion, CoreApi, InitOptions, RawVariant};
use crate::host::HostApi;

const HEADER: usize = 16;

unsafe extern "C" fn host_alloc(size: usize) -> *mut c_void {
    let layout = Layout::from_size_align(size + HEADER, HEADER).unwrap();
    unsafe {
        let base = alloc(layout);
        base.cast::<usize>().write(size);
        base.add(HEADER).cast()
    }
}

unsafe extern "C" fn host_free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let base = ptr.cast::<u8>().sub(HEADER);
        let size = base.cast::<usize>().read();
        dealloc(base, Layout::from_size_align(size + HEADER, HEADER).unwrap());
    }
}

unsafe extern "C" fn host_print(_msg: *const u8, _len: usize) {}

unsafe extern "C" fn host_get_singleton(_name: *const c_char) -> *mut c_void {
    core::ptr::null_mut()
}

unsafe extern "C" fn host_get_class_constructor(_name: *const c_char) -> *mut c_void {
    core::ptr::null_mut()
}

unsafe extern "C" fn host_method_bind_get(
    _class: *const c_char,
    method: *const c_char,
) -> *mut c_void {
    // Methods prefixed "missing_" simulate an ABI/schema mismatch.
    let name = unsafe { core::ffi::CStr::from_ptr(method) };
    if name.to_bytes().starts_with(b"missing_") {
        return core::ptr::null_mut();
    }
    Box::into_raw(Box::new(0u8)).cast()
}

unsafe extern "C" fn host_method_bind_call(
    _bind: *mut c_void,
    _instance: *mut c_void,
    _args: *const RawVariant,
    _num_args: c_int,
) -> RawVariant {
    RawVariant::nil()
}

/// Leak a core table and resolve it into a [`HostApi`].
pub(crate) fn host() -> HostApi {
    let core = Box::leak(Box::new(CoreApi {
        version: ApiVersion::new(1, 0),
        extensions: core::ptr::null(),
        num_extensions: 0,
        alloc: Some(host_alloc),
        free: Some(host_free),
        print: Some(host_print),
        get_singleton: Some(host_get_singleton),
        get_class_constructor: Some(host_get_class_constructor),
        method_bind_get_method: Some(host_method_bind_get),
        method_bind_call: Some(host_method_bind_call),
    }));
    let options = InitOptions {
        api: core,
        library: NonNull::<c_void>::dangling().as_ptr(),
        in_editor: false,
    };
    unsafe { HostApi::from_options(&options) }.unwrap()
}
