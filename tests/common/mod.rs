//! A full mock host for integration tests.
//!
//! Unlike the minimal unit-test host inside the ffi crate, this one offers
//! the complete extension chain (nativescript 1.0 with the 1.1
//! sub-extension behind it) and captures everything the plugin tells the
//! host: printed lines, registered classes and methods, assigned type
//! tags, and instance binding language indices. Captured method entries
//! keep their trampoline pointers so tests can call back in host-style.
//!
//! All capture state is global to the test binary; tests serialize on
//! [`TEST_LOCK`] and clear it with [`reset`].

#![allow(dead_code)]

use std::alloc::{Layout, alloc, dealloc};
use std::ffi::{CStr, c_char, c_int, c_void};
use std::sync::{Mutex, MutexGuard};

use nativebind::abi::{
    ApiVersion, CoreApi, EXT_NATIVESCRIPT, ExtensionHeader, InitOptions, InstanceBindingFunctions,
    InstanceCreateFunc, InstanceDestroyFunc, InstanceMethod, Nativescript11Api, NativescriptApi,
    RawMethodAttributes, RawVariant, TerminateOptions,
};

const HEADER: usize = 16;

/// A method entry as the host captured it at registration time.
pub struct RegisteredMethod {
    pub class: String,
    pub name: String,
    pub rpc_type: u32,
    pub entry: InstanceMethod,
}

/// A class entry as the host captured it, with its lifecycle trampolines.
pub struct RegisteredClass {
    pub name: String,
    pub base: String,
    pub create: InstanceCreateFunc,
    pub destroy: InstanceDestroyFunc,
}

// The captured entries hold trampoline pointers, which are process-global
// function pointers plus leaked method data; moving them between test
// threads is sound.
unsafe impl Send for RegisteredMethod {}
unsafe impl Send for RegisteredClass {}

pub static TEST_LOCK: Mutex<()> = Mutex::new(());
pub static PRINTED: Mutex<Vec<String>> = Mutex::new(Vec::new());
pub static CLASSES: Mutex<Vec<RegisteredClass>> = Mutex::new(Vec::new());
pub static METHODS: Mutex<Vec<RegisteredMethod>> = Mutex::new(Vec::new());
pub static TYPE_TAGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
pub static UNREGISTERED_LANGUAGES: Mutex<Vec<c_int>> = Mutex::new(Vec::new());
pub static PROFILING: Mutex<Vec<(String, u64)>> = Mutex::new(Vec::new());

/// The language index the mock assigns at instance binding registration.
pub const LANGUAGE_INDEX: c_int = 7;

/// Serialize on the capture state and clear it.
pub fn lock() -> MutexGuard<'static, ()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();
    guard
}

pub fn reset() {
    PRINTED.lock().unwrap().clear();
    CLASSES.lock().unwrap().clear();
    METHODS.lock().unwrap().clear();
    TYPE_TAGS.lock().unwrap().clear();
    UNREGISTERED_LANGUAGES.lock().unwrap().clear();
    PROFILING.lock().unwrap().clear();
}

fn str_of(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

// === Core table ===

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

unsafe extern "C" fn host_print(msg: *const u8, len: usize) {
    let bytes = unsafe { std::slice::from_raw_parts(msg, len) };
    PRINTED
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(bytes).into_owned());
}

unsafe extern "C" fn host_get_singleton(_name: *const c_char) -> *mut c_void {
    std::ptr::null_mut()
}

unsafe extern "C" fn host_get_class_constructor(_name: *const c_char) -> *mut c_void {
    std::ptr::null_mut()
}

unsafe extern "C" fn host_method_bind_get(
    _class: *const c_char,
    method: *const c_char,
) -> *mut c_void {
    // Methods prefixed "missing_" simulate a schema/host version mismatch.
    let name = unsafe { CStr::from_ptr(method) };
    if name.to_bytes().starts_with(b"missing_") {
        return std::ptr::null_mut();
    }
    Box::into_raw(Box::new(0u8)).cast()
}

unsafe extern "C" fn host_method_bind_call(
    _bind: *mut c_void,
    _instance: *mut c_void,
    _args: *const RawVariant,
    num_args: c_int,
) -> RawVariant {
    // Engine methods answer with their argument count, so tests can see
    // the call crossed the wire.
    let mut ret = RawVariant::nil();
    ret.kind = 2; // Int
    ret.data.int = i64::from(num_args.max(0));
    ret
}

// === Nativescript extension ===

unsafe extern "C" fn ns_register_class(
    _handle: *mut c_void,
    name: *const c_char,
    base: *const c_char,
    create: InstanceCreateFunc,
    destroy: InstanceDestroyFunc,
) {
    CLASSES.lock().unwrap().push(RegisteredClass {
        name: str_of(name),
        base: str_of(base),
        create,
        destroy,
    });
}

unsafe extern "C" fn ns_register_method(
    _handle: *mut c_void,
    class: *const c_char,
    method: *const c_char,
    attributes: RawMethodAttributes,
    entry: InstanceMethod,
) {
    METHODS.lock().unwrap().push(RegisteredMethod {
        class: str_of(class),
        name: str_of(method),
        rpc_type: attributes.rpc_type,
        entry,
    });
}

unsafe extern "C" fn ns11_set_type_tag(
    _handle: *mut c_void,
    name: *const c_char,
    _tag: *const c_void,
) {
    TYPE_TAGS.lock().unwrap().push(str_of(name));
}

unsafe extern "C" fn ns11_register_instance_binding(
    _functions: InstanceBindingFunctions,
) -> c_int {
    LANGUAGE_INDEX
}

unsafe extern "C" fn ns11_unregister_instance_binding(language_index: c_int) {
    UNREGISTERED_LANGUAGES.lock().unwrap().push(language_index);
}

unsafe extern "C" fn ns11_get_instance_binding(
    _language_index: c_int,
    _instance: *mut c_void,
) -> *mut c_void {
    std::ptr::null_mut()
}

unsafe extern "C" fn ns11_profiling_add_data(signature: *const c_char, time_usec: u64) {
    PROFILING.lock().unwrap().push((str_of(signature), time_usec));
}

// === Table builders ===

/// Leak a full host table set: core table, nativescript extension, and the
/// 1.1 sub-extension chained behind it.
pub fn init_options() -> InitOptions {
    let v11 = Box::leak(Box::new(Nativescript11Api {
        ext_type: EXT_NATIVESCRIPT,
        version: ApiVersion::new(1, 1),
        next: std::ptr::null(),
        set_type_tag: Some(ns11_set_type_tag),
        register_instance_binding_functions: Some(ns11_register_instance_binding),
        unregister_instance_binding_functions: Some(ns11_unregister_instance_binding),
        get_instance_binding: Some(ns11_get_instance_binding),
        profiling_add_data: Some(ns11_profiling_add_data),
    }));
    let ns = Box::leak(Box::new(NativescriptApi {
        ext_type: EXT_NATIVESCRIPT,
        version: ApiVersion::new(1, 0),
        next: (v11 as *const Nativescript11Api).cast::<ExtensionHeader>(),
        register_class: Some(ns_register_class),
        register_method: Some(ns_register_method),
    }));
    let extensions = Box::leak(Box::new([
        (ns as *const NativescriptApi).cast::<ExtensionHeader>() as *const ExtensionHeader,
    ]));
    let core = Box::leak(Box::new(CoreApi {
        version: ApiVersion::new(1, 1),
        extensions: extensions.as_ptr(),
        num_extensions: 1,
        alloc: Some(host_alloc),
        free: Some(host_free),
        print: Some(host_print),
        get_singleton: Some(host_get_singleton),
        get_class_constructor: Some(host_get_class_constructor),
        method_bind_get_method: Some(host_method_bind_get),
        method_bind_call: Some(host_method_bind_call),
    }));
    InitOptions {
        api: core,
        library: Box::into_raw(Box::new(0u8)).cast(),
        in_editor: false,
    }
}

/// Like [`init_options`] but with no extensions at all.
pub fn bare_init_options() -> InitOptions {
    let core = Box::leak(Box::new(CoreApi {
        version: ApiVersion::new(1, 0),
        extensions: std::ptr::null(),
        num_extensions: 0,
        alloc: Some(host_alloc),
        free: Some(host_free),
        print: Some(host_print),
        get_singleton: Some(host_get_singleton),
        get_class_constructor: Some(host_get_class_constructor),
        method_bind_get_method: Some(host_method_bind_get),
        method_bind_call: Some(host_method_bind_call),
    }));
    InitOptions {
        api: core,
        library: Box::into_raw(Box::new(0u8)).cast(),
        in_editor: false,
    }
}

pub fn terminate_options() -> TerminateOptions {
    TerminateOptions { in_editor: false }
}

/// An arbitrary non-null nativescript handle.
pub fn handle() -> *mut c_void {
    Box::into_raw(Box::new(0u8)).cast()
}
