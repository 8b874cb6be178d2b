//! Plugin lifecycle state machine.
//!
//! A [`Context`] owns everything the plugin accumulates across the host's
//! lifecycle callbacks: the resolved host tables, the type tag database,
//! the managed class registry, and the engine method bind cache. The host
//! drives it through five phases:
//!
//! ```text
//! Uninitialized --plugin_init--> Initialized --nativescript_init-->
//! ClassesRegistering --ready--> Ready --plugin_terminate--> Terminated
//! ```
//!
//! Every entry point checks the phase first and refuses out-of-order calls
//! with a [`LifecycleError`], so a misbehaving host loader fails loudly
//! instead of dispatching into half-built tables. A terminated context
//! accepts nothing and cannot be revived.

use std::any::Any;
use std::ffi::{c_int, c_void};

use tracing::{debug, info};

use nativebind_ffi::abi::{InitOptions, InstanceBindingFunctions, TerminateOptions};
use nativebind_ffi::instance::{self, MethodFlags};
use nativebind_ffi::{
    ClassRegistry, HostApi, InitError, IntoMethodAdapter, MethodBindTable, NativeClass,
    NativescriptExt, Schema, TagDb, TypeTag, Variant,
};

use crate::error::{ContextError, LifecycleError};

/// Where the context is in the host lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    ClassesRegistering,
    Ready,
    Terminated,
}

/// The plugin's binding context.
pub struct Context {
    phase: Phase,
    schema: Schema,
    host: Option<HostApi>,
    handle: *mut c_void,
    language_index: Option<c_int>,
    tags: TagDb,
    classes: ClassRegistry,
    binds: MethodBindTable,
}

impl Context {
    /// A fresh context over the engine class description.
    pub fn new(schema: Schema) -> Self {
        Context {
            phase: Phase::Uninitialized,
            schema,
            host: None,
            handle: std::ptr::null_mut(),
            language_index: None,
            tags: TagDb::new(),
            classes: ClassRegistry::new(),
            binds: MethodBindTable::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn require_phase(&self, expected: Phase) -> Result<(), LifecycleError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(LifecycleError {
                expected,
                actual: self.phase,
            })
        }
    }

    fn host(&self) -> HostApi {
        // Set in plugin_init; every caller has already passed a phase check
        // that implies it.
        match self.host {
            Some(host) => host,
            None => unreachable!("host table is resolved before leaving Uninitialized"),
        }
    }

    fn nativescript(&self) -> Result<NativescriptExt, InitError> {
        self.host()
            .nativescript
            .ok_or(InitError::MissingExtension { major: 1, minor: 0 })
    }

    /// First host callback: resolve the function pointer tables.
    ///
    /// # Safety
    ///
    /// `options.api`, when non-null, must point to a host table that stays
    /// valid for the process lifetime.
    pub unsafe fn plugin_init(&mut self, options: &InitOptions) -> Result<(), ContextError> {
        self.require_phase(Phase::Uninitialized)?;
        let host = unsafe { HostApi::from_options(options) }?;
        info!(
            major = host.version.major,
            minor = host.version.minor,
            in_editor = options.in_editor,
            "plugin initialized"
        );
        self.host = Some(host);
        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Second host callback: open the class registration window.
    ///
    /// Requires the nativescript extension; resolves an engine method bind
    /// for every method the schema declares, failing the load on the first
    /// method the running host cannot resolve. When the 1.1 sub-extension
    /// is present, registers instance binding callbacks and records the
    /// language index the host assigned.
    ///
    /// # Safety
    ///
    /// `handle` must be the host's nativescript handle for this plugin and
    /// stay valid until termination.
    pub unsafe fn nativescript_init(&mut self, handle: *mut c_void) -> Result<(), ContextError> {
        self.require_phase(Phase::Initialized)?;
        let ns = self.nativescript()?;
        let host = self.host();

        let mut resolved = 0;
        for class in self.schema.classes() {
            resolved += self.binds.resolve_class(&host, class)?;
        }
        debug!(
            classes = self.schema.len(),
            methods = resolved,
            "engine method binds resolved"
        );

        if let Some(v11) = ns.v11 {
            self.language_index =
                Some(v11.register_instance_binding(InstanceBindingFunctions::default()));
        }

        self.handle = handle;
        self.phase = Phase::ClassesRegistering;
        Ok(())
    }

    /// Register a managed wrapper class with both sides.
    ///
    /// Records the type tag relation locally, registers the class with the
    /// host together with its construction and destruction trampolines,
    /// and (with the 1.1 sub-extension) tells the host the tag to report
    /// for instances of this class.
    ///
    /// # Safety
    ///
    /// Must only be called between `nativescript_init` and `ready`, with
    /// the handle passed to `nativescript_init` still valid (the phase
    /// check enforces the former).
    pub unsafe fn register_class<T: NativeClass>(&mut self) -> Result<(), ContextError> {
        self.require_phase(Phase::ClassesRegistering)?;
        let ns = self.nativescript()?;

        self.tags.register(T::type_tag(), T::base_type_tag())?;
        self.classes.register_class::<T>()?;

        let base = T::BASE_CLASS_NAME.unwrap_or("");
        unsafe {
            ns.register_class(
                self.handle,
                T::CLASS_NAME,
                base,
                instance::create_func::<T>(),
                instance::destroy_func::<T>(),
            )
        }?;
        if let Some(v11) = ns.v11 {
            unsafe { v11.set_type_tag(self.handle, T::CLASS_NAME, T::type_tag()) }?;
        }

        debug!(class = T::CLASS_NAME, base, "registered class");
        Ok(())
    }

    /// Register a method of an already-registered managed class.
    ///
    /// The typed function is wrapped in a dispatch adapter for local
    /// invocation and in an `extern "C"` trampoline for the host.
    ///
    /// # Safety
    ///
    /// Same requirements as [`Context::register_class`].
    pub unsafe fn register_method<T, F, Marker>(
        &mut self,
        name: &str,
        flags: MethodFlags,
        func: F,
    ) -> Result<(), ContextError>
    where
        T: NativeClass,
        F: IntoMethodAdapter<T, Marker>,
    {
        self.require_phase(Phase::ClassesRegistering)?;
        let ns = self.nativescript()?;
        let host = self.host();

        let adapter = self.classes.register_method::<T, F, Marker>(name, func)?;
        unsafe {
            ns.register_method(
                self.handle,
                T::CLASS_NAME,
                name,
                flags.to_raw(),
                instance::method_func::<T>(adapter, host),
            )
        }?;

        debug!(class = T::CLASS_NAME, method = name, "registered method");
        Ok(())
    }

    /// Close the registration window and start serving dispatches.
    pub fn ready(&mut self) -> Result<(), ContextError> {
        self.require_phase(Phase::ClassesRegistering)?;
        for class in self.schema.classes() {
            if !self.binds.covers(class) {
                return Err(InitError::IncompleteBindCoverage {
                    class: class.name.clone(),
                }
                .into());
            }
        }
        info!(
            classes = self.classes.len(),
            binds = self.binds.len(),
            "binding context ready"
        );
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Dispatch a call into a managed instance by class and method name.
    pub fn invoke(
        &self,
        class: &str,
        method: &str,
        instance: &mut dyn Any,
        args: &[Variant],
    ) -> Result<Option<Variant>, ContextError> {
        self.require_phase(Phase::Ready)?;
        Ok(self.classes.dispatch(class, method, instance, args)?)
    }

    /// Call an engine method through its cached bind.
    ///
    /// # Safety
    ///
    /// `instance` must be a live native instance of `class`.
    pub unsafe fn call_engine_method(
        &self,
        class: &str,
        method: &str,
        instance: *mut c_void,
        args: &[Variant],
    ) -> Result<Variant, ContextError> {
        self.require_phase(Phase::Ready)?;
        let host = self.host();
        Ok(unsafe { self.binds.call(&host, class, method, instance, args) }?)
    }

    /// Whether `tag` names `ancestor` or a transitive subtype of it.
    pub fn is_subtype(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        self.tags.is_subtype(tag, ancestor)
    }

    /// Print a line through the host's output channel.
    pub fn print(&self, message: &str) -> Result<(), ContextError> {
        if self.host.is_none() {
            return Err(LifecycleError {
                expected: Phase::Ready,
                actual: self.phase,
            }
            .into());
        }
        self.host().print(message);
        Ok(())
    }

    /// Feed one timing sample into the host profiler.
    ///
    /// A no-op when the host offers no profiler (no 1.1 sub-extension, or
    /// an empty profiling slot).
    pub fn profiling_add_data(&self, signature: &str, time_usec: u64) -> Result<(), ContextError> {
        self.require_phase(Phase::Ready)?;
        if let Some(v11) = self.nativescript()?.v11 {
            v11.profiling_add_data(signature, time_usec)?;
        }
        Ok(())
    }

    /// Host callback closing the nativescript session.
    pub fn nativescript_terminate(&mut self) -> Result<(), ContextError> {
        self.require_phase(Phase::Ready)?;
        if let (Ok(ns), Some(index)) = (self.nativescript(), self.language_index.take())
            && let Some(v11) = ns.v11
        {
            v11.unregister_instance_binding(index);
        }
        self.handle = std::ptr::null_mut();
        Ok(())
    }

    /// Final host callback. Drops every table; the context stays dead.
    pub fn plugin_terminate(&mut self, options: &TerminateOptions) -> Result<(), ContextError> {
        if matches!(self.phase, Phase::Uninitialized | Phase::Terminated) {
            return Err(LifecycleError {
                expected: Phase::Ready,
                actual: self.phase,
            }
            .into());
        }
        info!(in_editor = options.in_editor, "plugin terminated");
        // The instance binding registration survives a skipped
        // nativescript_terminate; release it with the host still resolved.
        if let Some(index) = self.language_index.take()
            && let Some(host) = self.host
            && let Some(ns) = host.nativescript
            && let Some(v11) = ns.v11
        {
            v11.unregister_instance_binding(index);
        }
        self.tags.clear();
        self.classes.clear();
        self.binds.clear();
        self.host = None;
        self.handle = std::ptr::null_mut();
        self.phase = Phase::Terminated;
        Ok(())
    }
}
