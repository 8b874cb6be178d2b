//! Error types for the core value model and registries.
//!
//! Each phase gets its own enum so callers can match on exactly the failures
//! that phase can produce:
//!
//! ```text
//! VariantError       - conversion/cast failures (per-call, recoverable)
//! RegistrationError  - type/method registration failures (fatal at init)
//! SchemaError        - malformed or incomplete class description input
//! ```

use thiserror::Error;

use crate::TypeTag;

/// Errors from variant conversion and casting.
///
/// These are per-call errors: the failing conversion produces no value but
/// leaves all process-wide state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariantError {
    /// The variant's active tag does not support the requested target type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer value does not fit the requested target type.
    #[error("integer {value} out of range for {target}")]
    IntegerOverflow { value: i128, target: &'static str },

    /// A wire-level tag the variant union cannot represent.
    #[error("unrepresentable variant tag {0}")]
    Unrepresentable(u32),
}

/// Errors raised while populating the type tag and class registries.
///
/// All of these indicate a configuration or binding-generation bug and are
/// fatal at initialization: continuing would run with an inconsistent
/// binding set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The tag is already registered with a different parent.
    #[error("tag {tag} already registered with parent {existing:?}, refusing {requested:?}")]
    TagConflict {
        tag: TypeTag,
        existing: Option<TypeTag>,
        requested: Option<TypeTag>,
    },

    /// Registering this tag would make it its own transitive ancestor.
    #[error("tag {tag} would become its own ancestor")]
    TagCycle { tag: TypeTag },

    /// A class with this name is already registered.
    #[error("class '{0}' is already registered")]
    DuplicateClass(String),

    /// The class already has a method with this name.
    #[error("class '{class}' already has a method '{method}'")]
    DuplicateMethod { class: String, method: String },

    /// A method was registered against a class that was never registered.
    #[error("class '{0}' is not registered")]
    UnknownClass(String),

    /// A method declared more parameters than the dispatch layer supports.
    #[error("unsupported arity {arity} (maximum is {max})")]
    UnsupportedArity { arity: usize, max: usize },

    /// A class or method name the host cannot accept (interior NUL).
    #[error("name '{0}' cannot cross the ABI")]
    InvalidName(String),
}

/// Errors from parsing or querying the class description file.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The class description file is not valid JSON for the expected shape.
    #[error("malformed class description: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two class descriptors share a name.
    #[error("schema declares class '{0}' twice")]
    DuplicateClass(String),

    /// A lookup named a class the schema does not declare.
    #[error("schema has no class named '{0}'")]
    UnknownClass(String),
}
