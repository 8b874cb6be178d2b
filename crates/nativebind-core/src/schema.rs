//! Serde model of the engine's class description file.
//!
//! The host ships a machine-readable description of its exposed class
//! hierarchy (one JSON array of class descriptors, snake_case field names).
//! The binding layer consumes it twice: the method-bind table resolves a
//! native handle for every declared method, and the lifecycle context
//! verifies registration coverage before going ready.
//!
//! The external tool that produces this file, and the wrapper-source
//! generator that templates over it, are not part of this crate.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::SchemaError;

/// One exposed engine class.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    /// Empty for the hierarchy root.
    #[serde(default)]
    pub base_class: String,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub instanciable: bool,
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl ClassDescriptor {
    pub fn has_base(&self) -> bool {
        !self.base_class.is_empty()
    }
}

/// One exposed method on an engine class.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub getter: String,
    #[serde(default)]
    pub setter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<String, i64>,
}

/// The full class description, indexed by class name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: Vec<ClassDescriptor>,
    index: FxHashMap<String, usize>,
}

impl Schema {
    /// Parse the description file.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let classes: Vec<ClassDescriptor> = serde_json::from_str(json)?;
        Self::from_classes(classes)
    }

    /// Build a schema from already-parsed descriptors.
    pub fn from_classes(classes: Vec<ClassDescriptor>) -> Result<Self, SchemaError> {
        let mut index = FxHashMap::default();
        for (i, class) in classes.iter().enumerate() {
            if index.insert(class.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateClass(class.name.clone()));
            }
        }
        Ok(Self { classes, index })
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    /// Like [`Schema::get`] but failing with the class name.
    pub fn expect(&self, name: &str) -> Result<&ClassDescriptor, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownClass(name.to_owned()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "Node",
            "base_class": "",
            "singleton": false,
            "instanciable": true,
            "is_reference": false,
            "constants": { "NOTIFICATION_READY": 13 },
            "methods": [
                { "name": "get_name", "return_type": "String", "arguments": [] },
                {
                    "name": "set_name",
                    "return_type": "void",
                    "arguments": [ { "name": "name", "type": "String" } ]
                }
            ],
            "properties": [
                { "name": "name", "type": "String", "getter": "get_name", "setter": "set_name" }
            ],
            "enums": [
                { "name": "PauseMode", "values": { "PAUSE_MODE_INHERIT": 0, "PAUSE_MODE_STOP": 1 } }
            ]
        },
        { "name": "Node2D", "base_class": "Node", "instanciable": true }
    ]"#;

    #[test]
    fn parses_sample_description() {
        let schema = Schema::from_json(SAMPLE).unwrap();
        assert_eq!(schema.len(), 2);

        let node = schema.get("Node").unwrap();
        assert!(!node.has_base());
        assert_eq!(node.methods.len(), 2);
        assert_eq!(node.methods[1].arguments[0].ty, "String");
        assert_eq!(node.constants["NOTIFICATION_READY"], 13);
        assert_eq!(node.enums[0].values["PAUSE_MODE_STOP"], 1);

        let node2d = schema.get("Node2D").unwrap();
        assert_eq!(node2d.base_class, "Node");
        assert!(node2d.methods.is_empty());
    }

    #[test]
    fn duplicate_class_names_rejected() {
        let json = r#"[ { "name": "Node" }, { "name": "Node" } ]"#;
        assert!(matches!(
            Schema::from_json(json),
            Err(SchemaError::DuplicateClass(_))
        ));
    }

    #[test]
    fn unknown_class_lookup_fails() {
        let schema = Schema::from_json(SAMPLE).unwrap();
        assert!(schema.get("Spatial").is_none());
        assert!(matches!(
            schema.expect("Spatial"),
            Err(SchemaError::UnknownClass(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Schema::from_json("{ not json"),
            Err(SchemaError::Parse(_))
        ));
    }
}
