//! Reflective dispatch from untyped argument arrays into typed methods.
//!
//! A [`MethodAdapter`] pairs a managed method with its declared parameter
//! kinds. Given an instance and a variant array it checks arity, casts
//! every positional argument to its declared kind, invokes the method, and
//! wraps the result — or produces `None` for void methods.
//!
//! Adapters are built from plain functions and closures through
//! [`IntoMethodAdapter`], which is implemented for every call shape from
//! `Fn(&mut T)` up to `Fn(&mut T, A1..A8)`. The arity bound is deliberate:
//! an enumerated, closed set of call shapes is exhaustively testable, and
//! the schema never declares more than eight parameters.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use nativebind_core::{
    FromVariant, IntoReturn, MAX_METHOD_ARITY, RegistrationError, TypeTag, Variant, VariantKind,
    VariantKinded,
};

use crate::error::DispatchError;

/// A managed wrapper type exposable to the host.
///
/// The class name doubles as the type's registration identity: its tag is
/// the hash of the name, so generated and hand-written registrations agree
/// without coordination.
pub trait NativeClass: Sized + 'static {
    const CLASS_NAME: &'static str;

    /// `None` for hierarchy roots.
    const BASE_CLASS_NAME: Option<&'static str>;

    /// Construct the managed state for a fresh native instance.
    fn init() -> Self;

    fn type_tag() -> TypeTag {
        TypeTag::from_name(Self::CLASS_NAME)
    }

    fn base_type_tag() -> Option<TypeTag> {
        Self::BASE_CLASS_NAME.map(TypeTag::from_name)
    }
}

type ErasedMethod =
    Arc<dyn Fn(&mut dyn Any, &[Variant]) -> Result<Option<Variant>, DispatchError> + Send + Sync>;

/// One managed method plus its declared parameter kinds.
///
/// Immutable after construction; cloning shares the underlying callable.
#[derive(Clone)]
pub struct MethodAdapter {
    param_kinds: Arc<[VariantKind]>,
    returns_value: bool,
    func: ErasedMethod,
}

impl MethodAdapter {
    /// Build an adapter from pre-erased parts.
    ///
    /// Adapters built through [`IntoMethodAdapter`] are arity-bounded by
    /// construction; this entry point is for generated tables and checks
    /// the bound explicitly.
    pub fn from_parts(
        param_kinds: Vec<VariantKind>,
        returns_value: bool,
        func: impl Fn(&mut dyn Any, &[Variant]) -> Result<Option<Variant>, DispatchError>
        + Send
        + Sync
        + 'static,
    ) -> Result<Self, RegistrationError> {
        if param_kinds.len() > MAX_METHOD_ARITY {
            return Err(RegistrationError::UnsupportedArity {
                arity: param_kinds.len(),
                max: MAX_METHOD_ARITY,
            });
        }
        Ok(MethodAdapter {
            param_kinds: param_kinds.into(),
            returns_value,
            func: Arc::new(func),
        })
    }

    pub fn param_kinds(&self) -> &[VariantKind] {
        &self.param_kinds
    }

    pub fn returns_value(&self) -> bool {
        self.returns_value
    }

    /// Route an untyped call into the typed method.
    ///
    /// The arity check runs before anything else, and every argument is
    /// cast before the method body executes — a failing call has no
    /// partial side effects.
    pub fn invoke(
        &self,
        instance: &mut dyn Any,
        args: &[Variant],
    ) -> Result<Option<Variant>, DispatchError> {
        if args.len() != self.param_kinds.len() {
            return Err(DispatchError::ArityMismatch {
                expected: self.param_kinds.len(),
                actual: args.len(),
            });
        }
        (self.func)(instance, args)
    }
}

impl fmt::Debug for MethodAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodAdapter")
            .field("param_kinds", &self.param_kinds)
            .field("returns_value", &self.returns_value)
            .finish_non_exhaustive()
    }
}

/// Conversion of typed functions into [`MethodAdapter`]s.
///
/// `Marker` disambiguates the blanket impls per call shape; callers never
/// name it (`ctx.register_method::<T, _, _>(...)`).
pub trait IntoMethodAdapter<T: NativeClass, Marker> {
    fn into_adapter(self) -> MethodAdapter;
}

macro_rules! impl_into_method_adapter {
    ($($idx:tt $arg:ident),*) => {
        impl<T, F, R $(, $arg)*> IntoMethodAdapter<T, fn($($arg,)*) -> R> for F
        where
            T: NativeClass,
            F: Fn(&mut T $(, $arg)*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($arg: FromVariant + VariantKinded + 'static,)*
        {
            #[allow(non_snake_case)]
            fn into_adapter(self) -> MethodAdapter {
                let param_kinds: Arc<[VariantKind]> = Arc::new([$(<$arg as VariantKinded>::KIND),*]);
                let func = move |instance: &mut dyn Any, args: &[Variant]| {
                    let this = instance.downcast_mut::<T>().ok_or(
                        DispatchError::InstanceTypeMismatch {
                            class: T::CLASS_NAME,
                        },
                    )?;
                    $(
                        let $arg = args[$idx]
                            .cast(<$arg as VariantKinded>::KIND)
                            .and_then(|cast| <$arg as FromVariant>::from_variant(&cast))
                            .map_err(|source| DispatchError::BadArgument {
                                index: $idx,
                                declared: <$arg as VariantKinded>::KIND,
                                source,
                            })?;
                    )*
                    Ok((self)(this $(, $arg)*).into_return())
                };
                MethodAdapter {
                    param_kinds,
                    returns_value: R::RETURNS_VALUE,
                    func: Arc::new(func),
                }
            }
        }
    };
}

impl_into_method_adapter!();
impl_into_method_adapter!(0 A0);
impl_into_method_adapter!(0 A0, 1 A1);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2, 3 A3);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2, 3 A3, 4 A4);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2, 3 A3, 4 A4, 5 A5);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2, 3 A3, 4 A4, 5 A5, 6 A6);
impl_into_method_adapter!(0 A0, 1 A1, 2 A2, 3 A3, 4 A4, 5 A5, 6 A6, 7 A7);

/// Registered state for one managed class.
#[derive(Debug)]
pub struct ClassEntry {
    pub name: &'static str,
    pub base: Option<&'static str>,
    pub tag: TypeTag,
    pub base_tag: Option<TypeTag>,
    methods: FxHashMap<String, MethodAdapter>,
}

impl ClassEntry {
    pub fn method(&self, name: &str) -> Option<&MethodAdapter> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// All registered managed classes and their dispatchable methods.
///
/// Write-once during the registration phase, read-only while serving
/// invokes; a failing dispatch never mutates it.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<&'static str, ClassEntry>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_class<T: NativeClass>(&mut self) -> Result<(), RegistrationError> {
        if self.classes.contains_key(T::CLASS_NAME) {
            return Err(RegistrationError::DuplicateClass(T::CLASS_NAME.to_owned()));
        }
        self.classes.insert(
            T::CLASS_NAME,
            ClassEntry {
                name: T::CLASS_NAME,
                base: T::BASE_CLASS_NAME,
                tag: T::type_tag(),
                base_tag: T::base_type_tag(),
                methods: FxHashMap::default(),
            },
        );
        Ok(())
    }

    /// Register a method for an already-registered class, returning a
    /// shared handle to the adapter for host-side registration.
    pub fn register_method<T, F, Marker>(
        &mut self,
        name: &str,
        func: F,
    ) -> Result<MethodAdapter, RegistrationError>
    where
        T: NativeClass,
        F: IntoMethodAdapter<T, Marker>,
    {
        let entry = self
            .classes
            .get_mut(T::CLASS_NAME)
            .ok_or_else(|| RegistrationError::UnknownClass(T::CLASS_NAME.to_owned()))?;
        if entry.methods.contains_key(name) {
            return Err(RegistrationError::DuplicateMethod {
                class: T::CLASS_NAME.to_owned(),
                method: name.to_owned(),
            });
        }
        let adapter = func.into_adapter();
        entry.methods.insert(name.to_owned(), adapter.clone());
        Ok(adapter)
    }

    pub fn get(&self, class: &str) -> Option<&ClassEntry> {
        self.classes.get(class)
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn adapter(&self, class: &str, method: &str) -> Option<&MethodAdapter> {
        self.classes.get(class)?.method(method)
    }

    /// Route `class.method(args)` to its adapter.
    pub fn dispatch(
        &self,
        class: &str,
        method: &str,
        instance: &mut dyn Any,
        args: &[Variant],
    ) -> Result<Option<Variant>, DispatchError> {
        let adapter = self
            .adapter(class, method)
            .ok_or_else(|| DispatchError::UnknownMethod {
                class: class.to_owned(),
                method: method.to_owned(),
            })?;
        adapter.invoke(instance, args)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}
