//! Loading field defaults from a JSON or YAML file.

use crate::builder::{Binding, ParserNode};
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a defaults file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read defaults file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON defaults file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "yaml")]
    #[error("failed to parse YAML defaults file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML defaults file {0} requires the `yaml` feature")]
    YamlUnsupported(PathBuf),

    #[error("defaults file {0} must contain a mapping at the top level")]
    NotAMapping(PathBuf),

    #[error("collision between keys in defaults file on key {0}")]
    KeyCollision(String),
}

/// Default values keyed by field dest, e.g. `s_a` for field `a` of `s`.
#[derive(Debug, Default)]
pub struct FileDefaults {
    values: IndexMap<String, Json>,
    consumed: HashSet<String>,
}

impl FileDefaults {
    /// Read and flatten the file at `path` against the parser tree.
    pub fn load(path: &Path, root: &ParserNode<'_>) -> Result<Self, FileError> {
        let text = std::fs::read_to_string(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = if is_yaml(path) {
            parse_yaml(path, &text)?
        } else {
            serde_json::from_str(&text).map_err(|source| FileError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };
        match document {
            Json::Object(map) => Self::from_mapping(map, root),
            _ => Err(FileError::NotAMapping(path.to_path_buf())),
        }
    }

    /// Flatten a mapping: a nested mapping under a nested-record field name
    /// contributes keys with that field's prefix.
    pub fn from_mapping(map: serde_json::Map<String, Json>, root: &ParserNode<'_>) -> Result<Self, FileError> {
        let mut values = IndexMap::new();
        flatten_into(map, root, &mut values)?;
        Ok(Self {
            values,
            consumed: HashSet::new(),
        })
    }

    /// The file value for `dest`, if any. Marks the key as consumed.
    pub fn take(&mut self, dest: &str) -> Option<Value> {
        let value = self.values.get(dest)?.clone();
        self.consumed.insert(dest.to_string());
        Some(Value::from(value))
    }

    /// Keys that matched no field, in file order.
    pub fn unconsumed(&self) -> Vec<&str> {
        self.values
            .keys()
            .filter(|k| !self.consumed.contains(*k))
            .map(String::as_str)
            .collect()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(feature = "yaml")]
fn parse_yaml(path: &Path, text: &str) -> Result<Json, FileError> {
    serde_yaml::from_str(text).map_err(|source| FileError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(path: &Path, _text: &str) -> Result<Json, FileError> {
    Err(FileError::YamlUnsupported(path.to_path_buf()))
}

fn flatten_into(
    map: serde_json::Map<String, Json>,
    node: &ParserNode<'_>,
    out: &mut IndexMap<String, Json>,
) -> Result<(), FileError> {
    for (key, value) in map {
        match (nested_child(node, &key), value) {
            (Some(child), Json::Object(inner)) => flatten_into(inner, child, out)?,
            (_, value) => {
                let dest = format!("{}{}", node.prefix, key);
                if out.contains_key(&dest) {
                    return Err(FileError::KeyCollision(dest));
                }
                out.insert(dest, value);
            }
        }
    }
    Ok(())
}

/// The node of nested-record field `name`, looking through union members
/// since they share the declaring record's prefix.
fn nested_child<'n, 's>(node: &'n ParserNode<'s>, name: &str) -> Option<&'n ParserNode<'s>> {
    node.fields.iter().find_map(|field| match &field.binding {
        Binding::Nested(child) if field.spec.name == name => Some(child),
        Binding::Subcommand { variants } => variants.iter().find_map(|v| nested_child(v, name)),
        _ => None,
    })
}
