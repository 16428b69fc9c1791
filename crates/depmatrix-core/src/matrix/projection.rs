//! Attribute projection of a matrix for export.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DepMatrixResult;
use crate::models::Matrix;

fn enabled() -> bool {
    true
}

/// Which module and edge attributes to keep when exporting a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    #[serde(default = "enabled")]
    pub group_name: bool,
    #[serde(default = "enabled")]
    pub group_index: bool,
    #[serde(default = "enabled")]
    pub source_name: bool,
    #[serde(default = "enabled")]
    pub source_index: bool,
    #[serde(default = "enabled")]
    pub target_name: bool,
    #[serde(default = "enabled")]
    pub target_index: bool,
    #[serde(default = "enabled")]
    pub imports: bool,
    #[serde(default = "enabled")]
    pub cardinal: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            group_name: true,
            group_index: true,
            source_name: true,
            source_index: true,
            target_name: true,
            target_index: true,
            imports: true,
            cardinal: true,
        }
    }
}

impl MatrixOptions {
    /// Every attribute disabled.
    pub fn none() -> Self {
        Self {
            group_name: false,
            group_index: false,
            source_name: false,
            source_index: false,
            target_name: false,
            target_index: false,
            imports: false,
            cardinal: false,
        }
    }

    /// Options from a name to flag map; unknown names are ignored.
    pub fn from_flags(flags: &HashMap<String, bool>) -> Self {
        let mut options = Self::default();
        for (name, &value) in flags {
            match name.as_str() {
                "group_name" => options.group_name = value,
                "group_index" => options.group_index = value,
                "source_name" => options.source_name = value,
                "source_index" => options.source_index = value,
                "target_name" => options.target_name = value,
                "target_index" => options.target_index = value,
                "imports" => options.imports = value,
                "cardinal" => options.cardinal = value,
                _ => {}
            }
        }
        options
    }

    fn dropped_module_keys(&self) -> Vec<&'static str> {
        [
            ("group_name", self.group_name),
            ("group_index", self.group_index),
        ]
        .into_iter()
        .filter_map(|(key, keep)| (!keep).then_some(key))
        .collect()
    }

    fn dropped_edge_keys(&self) -> Vec<&'static str> {
        [
            ("source_name", self.source_name),
            ("source_index", self.source_index),
            ("target_name", self.target_name),
            ("target_index", self.target_index),
            ("imports", self.imports),
            ("cardinal", self.cardinal),
        ]
        .into_iter()
        .filter_map(|(key, keep)| (!keep).then_some(key))
        .collect()
    }
}

fn strip_keys(entries: Option<&mut Value>, keys: &[&str]) {
    let Some(Value::Array(items)) = entries else {
        return;
    };
    for item in items.iter_mut() {
        if let Value::Object(map) = item {
            for key in keys {
                map.remove(*key);
            }
        }
    }
}

/// Serialize a matrix to a document holding only the selected attributes.
///
/// Only the keys named by [`MatrixOptions`] are removed. A module always keeps
/// its `name`, and modules of the finest matrix also keep `path`, so with
/// [`MatrixOptions::none`] module entries are not empty mappings; edge entries
/// are. Works on a freshly serialized copy; `matrix` is never modified.
pub fn project(matrix: &Matrix, options: &MatrixOptions) -> DepMatrixResult<Value> {
    let mut document = serde_json::to_value(matrix)?;
    if let Value::Object(root) = &mut document {
        strip_keys(root.get_mut("modules"), &options.dropped_module_keys());
        strip_keys(root.get_mut("imports"), &options.dropped_edge_keys());
    }
    Ok(document)
}

/// An empty document, used when no matrix has been built.
pub fn empty_document() -> Value {
    let mut root = Map::new();
    root.insert("modules".to_string(), Value::Array(Vec::new()));
    root.insert("imports".to_string(), Value::Array(Vec::new()));
    Value::Object(root)
}
