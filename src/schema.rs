//! Record declarations: the explicit schema a parser is derived from.
//!
//! A schema is either built in code through the builder methods on
//! [`RecordSchema`] and [`FieldSpec`], returned by a type's [`Record`]
//! implementation, or deserialized from a JSON declaration.

use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors in a record declaration, raised while building the parser and
/// before any argument is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON schema: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("duplicate argument name: {0}")]
    DuplicateName(String),

    #[error("duplicate short option '-{short}' on field '{field}'")]
    DuplicateShortOption { field: String, short: char },

    #[error("field '{0}' collides with a reserved option name")]
    ReservedName(String),

    #[error("invalid short option '{value}' on field '{field}': expected '-' and one ASCII letter or digit")]
    InvalidShortOption { field: String, value: String },

    #[error("positional field '{0}' cannot have a short option")]
    PositionalWithShortOption(String),

    #[error("field '{0}' cannot be both positional and a flag pair")]
    PositionalFlags(String),

    #[error("'as_flags' requires a bool field, but '{0}' is not one")]
    FlagsOnNonBool(String),

    #[error("nested record field '{0}' cannot be positional")]
    PositionalRecord(String),

    #[error("cannot have multiple subcommand fields: '{0}' is the second one on the same parser")]
    MultipleSubcommands(String),

    #[error("duplicate subcommand name '{name}' in field '{field}'")]
    DuplicateSubcommandName { field: String, name: String },

    #[error("union on field '{0}' mixes record and non-record members")]
    MixedUnion(String),

    #[error("literal on field '{0}' mixes values of different types")]
    MixedLiteral(String),

    #[error("field '{0}' declares an empty set of choices")]
    EmptyChoices(String),

    #[error("type {ty} of field '{field}' cannot be converted from a single argument")]
    UnsupportedType { field: String, ty: String },

    #[error("unknown encoding '{encoding}' on field '{field}'")]
    UnknownEncoding { field: String, encoding: String },

    #[error("required positional field '{0}' follows an optional positional")]
    RequiredPositionalAfterOptional(String),

    #[error("positional list field '{0}' must be the last positional")]
    PositionalListNotLast(String),
}

/// A converter supplied through the `parser` metadata.
///
/// Its output is never checked against the field's declared type.
#[derive(Clone)]
pub struct CustomParser {
    name: String,
    func: Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>,
}

impl CustomParser {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, input: &str) -> Result<Value, String> {
        (self.func)(input)
    }
}

impl fmt::Debug for CustomParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomParser").field(&self.name).finish()
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    Path,
    Bytes,
    Date,
    DateTime,
    /// An enumeration matched by exact member name.
    Enum { name: String, members: Vec<String> },
    /// A fixed set of primitive values of one kind.
    Literal(Vec<Value>),
    List(Box<FieldType>),
    Optional(Box<FieldType>),
    Union(Vec<FieldType>),
    Record(RecordSchema),
}

impl FieldType {
    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn enumeration<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// The schema of a nested record type.
    pub fn record<R: Record>() -> Self {
        FieldType::Record(R::schema())
    }

    /// The record a field of this type nests: a record, or a union whose
    /// only member is a record, optional or not.
    pub fn nested_record(&self) -> Option<&RecordSchema> {
        match self.unwrap_optional() {
            FieldType::Record(schema) => Some(schema),
            FieldType::Union(members) if members.len() == 1 => members[0].nested_record(),
            _ => None,
        }
    }

    /// Strip any number of `Optional` wrappers.
    pub fn unwrap_optional(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    /// Name used in conversion error messages, e.g. `invalid int value`.
    pub fn display_name(&self) -> String {
        match self {
            FieldType::Str => "str".to_string(),
            FieldType::Int => "int".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::Path => "path".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::Date => "date".to_string(),
            FieldType::DateTime => "datetime".to_string(),
            FieldType::Enum { name, .. } => name.clone(),
            FieldType::Literal(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("Literal[{}]", parts.join(", "))
            }
            FieldType::List(inner) => format!("list[{}]", inner.display_name()),
            FieldType::Optional(inner) => format!("{} | None", inner.display_name()),
            FieldType::Union(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.display_name()).collect();
                parts.join(" | ")
            }
            FieldType::Record(schema) => schema.name.clone(),
        }
    }
}

/// Per-field metadata overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
    /// Leave the field out of the parser; it keeps its default.
    pub ignore_arg: bool,
    /// Render a bool as `--name` / `--no-name`.
    pub as_flags: bool,
    /// Custom converter, only available when declaring in code.
    #[serde(skip)]
    pub parser: Option<CustomParser>,
    pub positional: bool,
    /// Short alias such as `-x`.
    pub short_option: Option<String>,
    pub help: Option<String>,
    pub metavar: Option<String>,
    /// strftime pattern for date and datetime fields.
    pub date_format: Option<String>,
    /// Encoding for bytes fields (default utf-8).
    pub encoding: Option<String>,
}

/// One declared field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Static default; `None` means the field is required.
    #[serde(default, deserialize_with = "present_value")]
    pub default: Option<Value>,
    #[serde(flatten)]
    pub meta: FieldMeta,
}

/// Keeps an explicit JSON `null` default distinct from a missing one.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            meta: FieldMeta::default(),
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.meta.help = Some(help.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.meta.metavar = Some(metavar.into());
        self
    }

    pub fn short_option(mut self, short: impl Into<String>) -> Self {
        self.meta.short_option = Some(short.into());
        self
    }

    pub fn positional(mut self) -> Self {
        self.meta.positional = true;
        self
    }

    pub fn as_flags(mut self) -> Self {
        self.meta.as_flags = true;
        self
    }

    pub fn ignore_arg(mut self) -> Self {
        self.meta.ignore_arg = true;
        self
    }

    pub fn parser<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.meta.parser = Some(CustomParser::new(name, func));
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.meta.date_format = Some(format.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.meta.encoding = Some(encoding.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A declared record type.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Parse a JSON declaration into a schema.
    pub fn from_json(json: &str) -> Result<RecordSchema, ConfigError> {
        let schema: RecordSchema = serde_json::from_str(json)?;
        Ok(schema)
    }

    /// Check the declaration by building a parser from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::builder::build(self, &crate::parser::ParseOptions::default()).map(|_| ())
    }

    /// The instance made of leaf defaults only, or `None` if any non-ignored
    /// leaf is required.
    pub fn default_instance(&self) -> Option<crate::value::Instance> {
        let mut instance = crate::value::Instance::new(self.name.clone());
        for field in &self.fields {
            let value = match (field.ty.nested_record(), &field.default) {
                (Some(nested), _) if !field.meta.ignore_arg => Value::Record(nested.default_instance()?),
                (_, Some(default)) => default.clone(),
                (_, None) if field.meta.ignore_arg => continue,
                (_, None) => return None,
            };
            instance.fields.insert(field.name.clone(), value);
        }
        Some(instance)
    }
}

/// A Rust type with a declared schema that serde can rebuild from an
/// assembled instance.
pub trait Record: DeserializeOwned {
    fn schema() -> RecordSchema;
}
