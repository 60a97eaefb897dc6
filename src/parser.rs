//! Entry points: build the parser, run it over the arguments, and assemble
//! the result.

use crate::assemble::assemble;
use crate::builder::{build, BuiltParser, FILE_ARG_ID};
use crate::file::{FileDefaults, FileError};
use crate::schema::{ConfigError, Record, RecordSchema};
use crate::value::Instance;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Root-level parser settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Add a `--file PATH` option that loads defaults from a JSON or YAML file.
    pub load_from_file: bool,
    /// Program name shown in usage. Defaults to the record name.
    pub prog: Option<String>,
    /// Description shown in help. Defaults to the record description.
    pub about: Option<String>,
    /// Enables `-V`/`--version`.
    pub version: Option<String>,
    /// Accept unambiguous prefixes of long options.
    pub allow_abbrev: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn load_from_file(mut self, yes: bool) -> Self {
        self.load_from_file = yes;
        self
    }

    pub fn allow_abbrev(mut self, yes: bool) -> Self {
        self.allow_abbrev = yes;
        self
    }
}

/// Errors returned by the parse entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record schema: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error(transparent)]
    File(#[from] FileError),

    #[error("missing required value for {0}")]
    MissingRequired(String),

    #[error("subcommand {0} matches no union member")]
    UnknownSubcommand(String),

    #[error("failed to build {record} from parsed values: {source}")]
    Deserialize {
        record: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse `args` (without the program name) into a dynamic instance of
/// `schema`.
pub fn try_parse_value_from<I, T>(schema: &RecordSchema, args: I, options: &ParseOptions) -> Result<Instance, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let BuiltParser { command, root } = build(schema, options)?;
    let bin = OsString::from(command.get_name());
    let argv = std::iter::once(bin).chain(args.into_iter().map(Into::into));
    let matches = command.try_get_matches_from(argv)?;

    let mut defaults = FileDefaults::default();
    if options.load_from_file {
        if let Some(path) = matches.get_one::<PathBuf>(FILE_ARG_ID) {
            defaults = FileDefaults::load(path, &root)?;
        }
    }

    let instance = assemble(&root, &matches, &mut defaults)?;

    let unconsumed = defaults.unconsumed();
    if !unconsumed.is_empty() {
        warn!(
            "the following keys from the defaults file were not consumed: {}",
            unconsumed.join(", ")
        );
    }

    Ok(instance)
}

/// Like [`try_parse_value_from`], but clap errors (including help and
/// version requests) print and exit the process.
pub fn parse_value_from<I, T>(schema: &RecordSchema, args: I, options: &ParseOptions) -> Result<Instance, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    try_parse_value_from(schema, args, options).map_err(exit_on_cli_error)
}

/// Parse `args` into a typed record.
pub fn try_parse_from<R, I, T>(args: I, options: &ParseOptions) -> Result<R, Error>
where
    R: Record,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let schema = R::schema();
    let instance = try_parse_value_from(&schema, args, options)?;
    from_instance(&instance)
}

pub fn parse_from<R, I, T>(args: I, options: &ParseOptions) -> Result<R, Error>
where
    R: Record,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    try_parse_from(args, options).map_err(exit_on_cli_error)
}

/// Parse the process arguments into a typed record.
pub fn parse<R: Record>(options: &ParseOptions) -> Result<R, Error> {
    parse_from(std::env::args_os().skip(1), options)
}

/// Rebuild a serde type from an assembled instance.
pub fn from_instance<R: DeserializeOwned>(instance: &Instance) -> Result<R, Error> {
    serde_json::from_value(instance.to_json()).map_err(|source| Error::Deserialize {
        record: instance.name.clone(),
        source,
    })
}

fn exit_on_cli_error(err: Error) -> Error {
    match err {
        Error::Cli(e) => e.exit(),
        other => other,
    }
}
