//! declargs - declarative command-line parsing from record schemas.
//!
//! A [`RecordSchema`] describes a record type field by field. This library
//! builds a clap parser from it, runs the parser over the arguments, and
//! assembles the parsed values back into an [`Instance`] or, through serde,
//! into a typed [`Record`].

pub mod assemble;
pub mod builder;
pub mod file;
pub mod parser;
pub mod rule;
pub mod schema;
pub mod value;

pub use builder::{build, generate_help, generate_usage, BuiltParser};
pub use file::{FileDefaults, FileError};
pub use parser::{
    from_instance, parse, parse_from, parse_value_from, try_parse_from, try_parse_value_from, Error,
    ParseOptions,
};
pub use schema::{ConfigError, CustomParser, FieldMeta, FieldSpec, FieldType, Record, RecordSchema};
pub use value::{Instance, Value};
