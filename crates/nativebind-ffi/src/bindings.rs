//! Per-class cache of resolved engine method handles.
//!
//! During nativescript initialization every method the schema declares for
//! a class is resolved by name through the host, once. A method the host
//! cannot resolve aborts the load — the generated bindings and the running
//! host version disagree, and silently skipping the method would produce
//! corrupt behavior indistinguishable from success. After initialization
//! the table is read-only and reads need no synchronization.

use core::ffi::c_void;

use rustc_hash::FxHashMap;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use nativebind_core::{ClassDescriptor, Variant, tag_constants};

use crate::error::{DispatchError, InitError};
use crate::host::{HostApi, MethodBind};

/// Hash key for a class+method pair, domain-separated from type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindKey(u64);

impl BindKey {
    pub fn new(class: &str, method: &str) -> Self {
        let seed = xxh64(class.as_bytes(), tag_constants::BIND);
        BindKey(xxh64(method.as_bytes(), seed))
    }
}

/// (class, method) -> resolved native handle.
#[derive(Debug, Default)]
pub struct MethodBindTable {
    binds: FxHashMap<BindKey, MethodBind>,
}

impl MethodBindTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every method the schema declares for `class`.
    ///
    /// All-or-nothing: on an unresolved method nothing is inserted and the
    /// load must be aborted with the returned [`InitError`].
    pub fn resolve_class(
        &mut self,
        host: &HostApi,
        class: &ClassDescriptor,
    ) -> Result<usize, InitError> {
        let mut resolved = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            let bind = host.method_bind_get(&class.name, &method.name).ok_or_else(|| {
                InitError::UnresolvedMethodBind {
                    class: class.name.clone(),
                    method: method.name.clone(),
                }
            })?;
            resolved.push((BindKey::new(&class.name, &method.name), bind));
        }
        let count = resolved.len();
        self.binds.extend(resolved);
        debug!(class = %class.name, methods = count, "resolved method binds");
        Ok(count)
    }

    /// Cached handle lookup. Never falls back to a by-name resolution.
    pub fn get(&self, class: &str, method: &str) -> Option<MethodBind> {
        self.binds.get(&BindKey::new(class, method)).copied()
    }

    /// Whether every method declared for `class` has a cached handle.
    pub fn covers(&self, class: &ClassDescriptor) -> bool {
        class
            .methods
            .iter()
            .all(|m| self.binds.contains_key(&BindKey::new(&class.name, &m.name)))
    }

    /// Forward a call to the engine through the cached handle.
    ///
    /// # Safety
    ///
    /// `instance` must be a live native instance of `class`.
    pub unsafe fn call(
        &self,
        host: &HostApi,
        class: &str,
        method: &str,
        instance: *mut c_void,
        args: &[Variant],
    ) -> Result<Variant, DispatchError> {
        let bind = self.get(class, method).ok_or_else(|| DispatchError::UnknownMethod {
            class: class.to_owned(),
            method: method.to_owned(),
        })?;
        unsafe { host.call_method_bind(bind, instance, args) }
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn clear(&mut self) {
        self.binds.clear();
    }
}
