//! Reading parsed matches back into a record instance.

use crate::builder::{Binding, FieldNode, ParserNode};
use crate::file::FileDefaults;
use crate::parser::Error;
use crate::rule::RuleKind;
use crate::value::{Instance, Value};
use clap::parser::ValueSource;
use clap::ArgMatches;
use tracing::debug;

/// Walk the node tree the builder produced and collect one value per field.
///
/// Leaf precedence is command line, then the defaults file, then the static
/// default.
pub fn assemble(node: &ParserNode<'_>, matches: &ArgMatches, defaults: &mut FileDefaults) -> Result<Instance, Error> {
    let mut instance = Instance::new(node.schema.name.clone());

    for field in &node.fields {
        let value = match &field.binding {
            Binding::Ignored => match field.spec.default {
                Some(ref default) => default.clone(),
                None => continue,
            },
            Binding::Value { id } => {
                let from_file = defaults.take(field.dest());
                let supplied = if matches.value_source(id) == Some(ValueSource::CommandLine) {
                    Some(read_value(matches, id, &field.rule.kind))
                } else {
                    None
                };
                resolve_leaf(field, supplied, from_file)?
            }
            Binding::Flags { positive, negative } => {
                let from_file = defaults.take(field.dest());
                let supplied = if matches.get_flag(positive) {
                    Some(Value::Bool(true))
                } else if matches.get_flag(negative) {
                    Some(Value::Bool(false))
                } else {
                    None
                };
                resolve_leaf(field, supplied, from_file)?
            }
            Binding::Nested(child) => Value::Record(assemble(child, matches, defaults)?),
            Binding::Subcommand { variants } => match matches.subcommand() {
                Some((name, sub_matches)) => {
                    let variant = variants
                        .iter()
                        .find(|v| v.schema.name == name)
                        .ok_or_else(|| Error::UnknownSubcommand(name.to_string()))?;
                    debug!(field = %field.dest(), subcommand = %name, "selected subcommand");
                    Value::Variant(assemble(variant, sub_matches, defaults)?)
                }
                None => field
                    .spec
                    .default
                    .clone()
                    .ok_or_else(|| Error::MissingRequired(field.dest().to_string()))?,
            },
        };
        instance.fields.insert(field.spec.name.clone(), value);
    }

    Ok(instance)
}

fn read_value(matches: &ArgMatches, id: &str, kind: &RuleKind<'_>) -> Value {
    match kind {
        RuleKind::List => Value::List(
            matches
                .get_many::<Value>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        ),
        _ => matches.get_one::<Value>(id).cloned().unwrap_or(Value::Null),
    }
}

fn resolve_leaf(field: &FieldNode<'_>, supplied: Option<Value>, from_file: Option<Value>) -> Result<Value, Error> {
    supplied
        .or(from_file)
        .or_else(|| field.spec.default.clone())
        .ok_or_else(|| Error::MissingRequired(field.dest().to_string()))
}
