//! Recursive construction of a clap Command from a record schema.

use crate::parser::ParseOptions;
use crate::rule::{resolve, ArgumentRule, RuleKind};
use crate::schema::{ConfigError, FieldSpec, RecordSchema};
use crate::value::Value;
use clap::{Arg, ArgAction, ArgGroup, Command};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Id and long name of the injected defaults-file option.
pub const FILE_ARG_ID: &str = "file";

/// The built parser together with the node tree used to read it back.
pub struct BuiltParser<'s> {
    pub command: Command,
    pub root: ParserNode<'s>,
}

/// One record type in the parser tree: the root, a nested record, or a
/// subcommand.
#[derive(Debug)]
pub struct ParserNode<'s> {
    pub schema: &'s RecordSchema,
    /// Dest prefix shared by this record's fields, e.g. `sub_`.
    pub prefix: String,
    pub fields: Vec<FieldNode<'s>>,
}

#[derive(Debug)]
pub struct FieldNode<'s> {
    pub spec: &'s FieldSpec,
    pub rule: ArgumentRule<'s>,
    pub binding: Binding<'s>,
}

impl FieldNode<'_> {
    pub fn dest(&self) -> &str {
        &self.rule.display_name
    }
}

/// Where a field's value lives in the parsed matches.
#[derive(Debug)]
pub enum Binding<'s> {
    Ignored,
    /// A scalar or list argument.
    Value { id: String },
    Flags { positive: String, negative: String },
    Nested(ParserNode<'s>),
    /// One node per union member, in declaration order.
    Subcommand { variants: Vec<ParserNode<'s>> },
}

/// Argument dash form of a dest: `sub_b_a` becomes `sub-b-a`.
pub fn dashed(dest: &str) -> String {
    dest.replace('_', "-")
}

/// Names taken within one clap command.
struct Scope {
    reserved: HashSet<String>,
    names: HashSet<String>,
    shorts: HashSet<char>,
    positional_index: usize,
    optional_positional: Option<String>,
    list_positional: Option<String>,
    subcommand: bool,
}

impl Scope {
    fn new(reserved: &[&str], shorts: &[char]) -> Self {
        Self {
            reserved: reserved.iter().map(|s| s.to_string()).collect(),
            names: HashSet::new(),
            shorts: shorts.iter().copied().collect(),
            positional_index: 1,
            optional_positional: None,
            list_positional: None,
            subcommand: false,
        }
    }

    fn claim_name(&mut self, name: &str, dest: &str) -> Result<(), ConfigError> {
        if self.reserved.contains(name) {
            return Err(ConfigError::ReservedName(dest.to_string()));
        }
        if !self.names.insert(name.to_string()) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn claim_short(&mut self, short: char, dest: &str) -> Result<(), ConfigError> {
        if !self.shorts.insert(short) {
            return Err(ConfigError::DuplicateShortOption {
                field: dest.to_string(),
                short,
            });
        }
        Ok(())
    }

    fn next_positional(&mut self, dest: &str, required: bool, list: bool) -> Result<usize, ConfigError> {
        if let Some(ref previous) = self.list_positional {
            return Err(ConfigError::PositionalListNotLast(previous.clone()));
        }
        if required && self.optional_positional.is_some() {
            return Err(ConfigError::RequiredPositionalAfterOptional(dest.to_string()));
        }
        if !required {
            self.optional_positional = Some(dest.to_string());
        }
        if list {
            self.list_positional = Some(dest.to_string());
        }
        let index = self.positional_index;
        self.positional_index += 1;
        Ok(index)
    }
}

/// Build the parser for `schema`, applying root-level options once.
pub fn build<'s>(schema: &'s RecordSchema, options: &ParseOptions) -> Result<BuiltParser<'s>, ConfigError> {
    let prog = options.prog.clone().unwrap_or_else(|| schema.name.clone());
    let mut cmd = Command::new(prog)
        .disable_help_subcommand(true)
        .args_override_self(true);

    if let Some(about) = options.about.clone().or_else(|| schema.description.clone()) {
        cmd = cmd.about(about);
    }

    let mut reserved = vec!["help"];
    let mut shorts = vec!['h'];

    if let Some(ref version) = options.version {
        cmd = cmd.version(version.clone());
        reserved.push("version");
        shorts.push('V');
    }

    if options.allow_abbrev {
        cmd = cmd.infer_long_args(true);
    }

    if options.load_from_file {
        reserved.push(FILE_ARG_ID);
        cmd = cmd.arg(
            Arg::new(FILE_ARG_ID)
                .long(FILE_ARG_ID)
                .value_name("PATH")
                .help("Load default values from a JSON or YAML file.")
                .value_parser(clap::value_parser!(PathBuf)),
        );
    }

    let mut scope = Scope::new(&reserved, &shorts);
    let (command, root) = build_record(cmd, schema, String::new(), None, &mut scope)?;
    Ok(BuiltParser { command, root })
}

/// Register every field of `schema` on `cmd`, recursing into nested records
/// and union members.
fn build_record<'s>(
    cmd: Command,
    schema: &'s RecordSchema,
    prefix: String,
    heading: Option<&str>,
    scope: &mut Scope,
) -> Result<(Command, ParserNode<'s>), ConfigError> {
    let mut cmd = cmd;
    let mut fields = Vec::with_capacity(schema.fields.len());

    for field in &schema.fields {
        let dest = format!("{}{}", prefix, field.name);
        let rule = resolve(field, &dest)?;

        let binding = match &rule.kind {
            RuleKind::Ignored => Binding::Ignored,
            RuleKind::Scalar | RuleKind::List => {
                let id = dashed(&dest);
                scope.claim_name(&id, &dest)?;
                if let Some(short) = rule.short {
                    scope.claim_short(short, &dest)?;
                }
                cmd = cmd.arg(build_value_arg(&id, &rule, heading, scope)?);
                debug!(field = %dest, id = %id, "registered argument");
                Binding::Value { id }
            }
            RuleKind::FlagPair => {
                let positive = dashed(&dest);
                let negative = format!("no-{}", positive);
                scope.claim_name(&positive, &dest)?;
                scope.claim_name(&negative, &dest)?;
                if let Some(short) = rule.short {
                    scope.claim_short(short, &dest)?;
                }
                let (pos_arg, neg_arg, group) = build_flag_pair(&positive, &negative, &rule, heading);
                cmd = cmd.arg(pos_arg).arg(neg_arg).group(group);
                debug!(field = %dest, positive = %positive, negative = %negative, "registered flag pair");
                Binding::Flags { positive, negative }
            }
            RuleKind::NestedRecord(nested) => {
                warn_ignored_default(field, nested, &dest);
                let (next, node) =
                    build_record(cmd, nested, format!("{}_", dest), Some(&dest), scope)?;
                cmd = next;
                Binding::Nested(node)
            }
            RuleKind::SubcommandUnion(members) => {
                if scope.subcommand {
                    return Err(ConfigError::MultipleSubcommands(dest));
                }
                scope.subcommand = true;

                let mut labels = HashSet::new();
                let mut variants = Vec::with_capacity(members.len());
                for member in members {
                    let name = member.name.clone();
                    let alias = name.to_lowercase();
                    if !labels.insert(name.clone()) || (alias != name && !labels.insert(alias.clone())) {
                        return Err(ConfigError::DuplicateSubcommandName {
                            field: dest.clone(),
                            name,
                        });
                    }

                    let mut sub = Command::new(name.clone())
                        .disable_help_subcommand(true)
                        .args_override_self(true);
                    if let Some(ref description) = member.description {
                        sub = sub.about(description.clone());
                    }
                    if alias != name {
                        sub = sub.visible_alias(alias);
                    }

                    // Members keep the declaring record's prefix.
                    let mut sub_scope = Scope::new(&["help"], &['h']);
                    let (sub, node) = build_record(sub, member, prefix.clone(), None, &mut sub_scope)?;
                    cmd = cmd.subcommand(sub);
                    variants.push(node);
                }

                cmd = cmd
                    .subcommand_required(rule.required)
                    .subcommand_value_name(dest.clone())
                    .subcommand_help_heading(dest.clone());
                debug!(field = %dest, variants = variants.len(), "registered subcommands");
                Binding::Subcommand { variants }
            }
        };

        fields.push(FieldNode {
            spec: field,
            rule,
            binding,
        });
    }

    Ok((
        cmd,
        ParserNode {
            schema,
            prefix,
            fields,
        },
    ))
}

fn build_value_arg(
    id: &str,
    rule: &ArgumentRule<'_>,
    heading: Option<&str>,
    scope: &mut Scope,
) -> Result<Arg, ConfigError> {
    let is_list = matches!(rule.kind, RuleKind::List);
    let mut arg = Arg::new(id.to_string())
        .help(rule.help.clone())
        .value_name(rule.metavar.clone())
        .allow_negative_numbers(true);

    if let Some(ref converter) = rule.converter {
        arg = arg.value_parser(converter.clone());
    }

    if rule.positional {
        if scope.subcommand {
            warn!(
                field = %rule.display_name,
                "positional field declared after a subcommand field is parsed before the subcommand"
            );
        }
        let index = scope.next_positional(&rule.display_name, rule.required, is_list)?;
        arg = arg.index(index).required(rule.required);
        if is_list {
            arg = arg.num_args(1..).action(ArgAction::Append);
        } else {
            arg = arg.action(ArgAction::Set);
        }
    } else {
        arg = arg
            .long(id.to_string())
            .required(rule.required)
            .action(ArgAction::Set);
        if let Some(short) = rule.short {
            arg = arg.short(short);
        }
        if is_list {
            // A list without default needs at least one value.
            arg = arg.num_args(if rule.required { 1.. } else { 0.. });
        }
    }

    if let Some(heading) = heading {
        arg = arg.help_heading(heading.to_string());
    }

    Ok(arg)
}

fn build_flag_pair(
    positive: &str,
    negative: &str,
    rule: &ArgumentRule<'_>,
    heading: Option<&str>,
) -> (Arg, Arg, ArgGroup) {
    let mut pos_arg = Arg::new(positive.to_string())
        .long(positive.to_string())
        .action(ArgAction::SetTrue)
        .help(rule.help.clone());
    if let Some(short) = rule.short {
        pos_arg = pos_arg.short(short);
    }

    let mut neg_arg = Arg::new(negative.to_string())
        .long(negative.to_string())
        .action(ArgAction::SetTrue)
        .help(format!("Set {} to False.", rule.display_name));

    if let Some(heading) = heading {
        pos_arg = pos_arg.help_heading(heading.to_string());
        neg_arg = neg_arg.help_heading(heading.to_string());
    }

    // At most one of the pair; exactly one when there is no default.
    let group = ArgGroup::new(format!("{}:flags", rule.display_name))
        .args([positive.to_string(), negative.to_string()])
        .multiple(false)
        .required(rule.required);

    (pos_arg, neg_arg, group)
}

/// Defaults on nested record fields are never applied; only leaf defaults
/// are. Say so when the two disagree.
fn warn_ignored_default(field: &FieldSpec, nested: &RecordSchema, dest: &str) {
    if let Some(ref default) = field.default {
        let from_leaves = nested.default_instance().map(Value::Record);
        if from_leaves.as_ref() != Some(default) {
            warn!(
                field = %dest,
                "default of nested record field is ignored; leaf defaults of {} apply instead",
                nested.name
            );
        }
    }
}

/// Generate the full help text for a record's parser.
pub fn generate_help(schema: &RecordSchema, options: &ParseOptions) -> Result<String, ConfigError> {
    let mut built = build(schema, options)?;
    Ok(built.command.render_help().to_string())
}

/// Generate the one-line usage for a record's parser.
pub fn generate_usage(schema: &RecordSchema, options: &ParseOptions) -> Result<String, ConfigError> {
    let mut built = build(schema, options)?;
    Ok(built.command.render_usage().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};
    use crate::value::Instance;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` and return the warnings it logged.
    fn warnings_of(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn options() -> ParseOptions {
        ParseOptions {
            prog: Some("prog".to_string()),
            ..ParseOptions::default()
        }
    }

    fn action1() -> RecordSchema {
        RecordSchema::new("Action1")
            .field(FieldSpec::new("a", FieldType::Int))
            .field(FieldSpec::new("b", FieldType::Str).default("abc"))
    }

    fn action2() -> RecordSchema {
        RecordSchema::new("Action2")
            .field(FieldSpec::new("c", FieldType::Int).default(42))
            .field(FieldSpec::new("e", FieldType::Str).default("def").positional())
    }

    fn sub_config() -> RecordSchema {
        RecordSchema::new("SubConfig")
            .field(FieldSpec::new("a", FieldType::Int).default(42))
            .field(FieldSpec::new("b", FieldType::Str).default("abc").help("a string"))
    }

    fn actions() -> FieldType {
        FieldType::Union(vec![FieldType::Record(action1()), FieldType::Record(action2())])
    }

    #[test]
    fn test_build_passes_clap_debug_assert() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("mode", FieldType::Str).positional())
            .field(FieldSpec::new("sub", FieldType::Record(sub_config())))
            .field(FieldSpec::new("action", actions()))
            .field(FieldSpec::new("flag", FieldType::Bool).default(false).as_flags().short_option("-f"))
            .field(FieldSpec::new("tags", FieldType::list(FieldType::Str)).default(Vec::<String>::new()));
        let built = build(&schema, &options()).unwrap();
        built.command.debug_assert();
    }

    #[test]
    fn test_node_tree_mirrors_declaration() {
        let nested = RecordSchema::new("NestedSub")
            .field(FieldSpec::new("a", FieldType::Int).default(42))
            .field(FieldSpec::new("b", FieldType::Record(sub_config())));
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("sub", FieldType::Record(nested)))
            .field(FieldSpec::new("hidden", FieldType::Str).default("x").ignore_arg());
        let built = build(&schema, &options()).unwrap();

        let root = &built.root;
        assert_eq!(root.fields.len(), 2);
        assert!(matches!(root.fields[1].binding, Binding::Ignored));
        let sub = match &root.fields[0].binding {
            Binding::Nested(node) => node,
            other => panic!("Expected Nested, got {:?}", other),
        };
        assert_eq!(sub.prefix, "sub_");
        let sub_b = match &sub.fields[1].binding {
            Binding::Nested(node) => node,
            other => panic!("Expected Nested, got {:?}", other),
        };
        assert_eq!(sub_b.prefix, "sub_b_");
        assert!(matches!(&sub_b.fields[0].binding, Binding::Value { id } if id == "sub-b-a"));
        assert_eq!(sub_b.fields[0].dest(), "sub_b_a");
    }

    #[test]
    fn test_union_members_keep_declaring_prefix() {
        let action4 = RecordSchema::new("Action4")
            .field(FieldSpec::new("sub_action", actions()))
            .field(FieldSpec::new("string4", FieldType::Str).default("four"));
        let schema = RecordSchema::new("Config").field(FieldSpec::new("sub", FieldType::Record(action4)));
        let built = build(&schema, &options()).unwrap();

        let action1 = built
            .command
            .get_subcommands()
            .find(|c| c.get_name() == "Action1")
            .unwrap();
        assert!(action1.get_arguments().any(|a| a.get_long() == Some("sub-a")));
        assert!(built
            .command
            .get_arguments()
            .any(|a| a.get_long() == Some("sub-string4")));
    }

    #[test]
    fn test_subcommand_has_lowercase_alias() {
        let schema = RecordSchema::new("Config").field(FieldSpec::new("action", actions()));
        let built = build(&schema, &options()).unwrap();
        let sub = built
            .command
            .get_subcommands()
            .find(|c| c.get_name() == "Action2")
            .unwrap();
        let aliases: Vec<&str> = sub.get_visible_aliases().collect();
        assert_eq!(aliases, vec!["action2"]);
    }

    #[test]
    fn test_warns_on_ignored_nested_default() {
        let other = Instance::new("SubConfig").with("a", 1).with("b", "zzz");
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("sub", FieldType::Record(sub_config())).default(other));
        let logs = warnings_of(|| {
            build(&schema, &options()).unwrap();
        });
        assert!(logs.contains("default of nested record field is ignored"), "{}", logs);

        let matching = sub_config().default_instance().unwrap();
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("sub", FieldType::Record(sub_config())).default(matching));
        let logs = warnings_of(|| {
            build(&schema, &options()).unwrap();
        });
        assert!(logs.is_empty(), "{}", logs);
    }

    #[test]
    fn test_warns_on_positional_after_subcommand() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("action", actions()))
            .field(FieldSpec::new("target", FieldType::Str).default("x").positional());
        let logs = warnings_of(|| {
            build(&schema, &options()).unwrap();
        });
        assert!(logs.contains("declared after a subcommand field"), "{}", logs);

        let before = RecordSchema::new("Config")
            .field(FieldSpec::new("target", FieldType::Str).default("x").positional())
            .field(FieldSpec::new("action", actions()));
        let logs = warnings_of(|| {
            build(&before, &options()).unwrap();
        });
        assert!(logs.is_empty(), "{}", logs);
    }

    #[test]
    fn test_single_record_union_builds_nested_options() {
        let schema = RecordSchema::new("Config").field(FieldSpec::new(
            "u",
            FieldType::Union(vec![FieldType::Record(sub_config())]),
        ));
        let built = build(&schema, &options()).unwrap();
        assert_eq!(built.command.get_subcommands().count(), 0);
        assert!(matches!(&built.root.fields[0].binding, Binding::Nested(node) if node.prefix == "u_"));
        assert!(built
            .command
            .get_arguments()
            .any(|a| a.get_long() == Some("u-a")));
    }

    #[test]
    fn test_error_duplicate_name_across_nested_tree() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("sub", FieldType::Record(sub_config())))
            .field(FieldSpec::new("sub_a", FieldType::Float).default(1.0));
        let result = build(&schema, &options());
        assert!(matches!(result, Err(ConfigError::DuplicateName(name)) if name == "sub-a"));
    }

    #[test]
    fn test_error_flag_negative_collision() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("x", FieldType::Bool).default(false).as_flags())
            .field(FieldSpec::new("no_x", FieldType::Int).default(0));
        assert!(matches!(build(&schema, &options()), Err(ConfigError::DuplicateName(_))));
    }

    #[test]
    fn test_subcommand_scope_allows_same_name() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("action", actions()))
            .field(FieldSpec::new("a", FieldType::Int).default(2));
        assert!(build(&schema, &options()).is_ok());
    }

    #[test]
    fn test_error_duplicate_short_option() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("a", FieldType::Int).default(1).short_option("-x"))
            .field(FieldSpec::new("b", FieldType::Int).default(1).short_option("-x"));
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::DuplicateShortOption { short: 'x', .. })
        ));
    }

    #[test]
    fn test_error_reserved_names() {
        let help = RecordSchema::new("Config").field(FieldSpec::new("help", FieldType::Str).default(""));
        assert!(matches!(build(&help, &options()), Err(ConfigError::ReservedName(_))));

        let short_h = RecordSchema::new("Config")
            .field(FieldSpec::new("host", FieldType::Str).default("").short_option("-h"));
        assert!(matches!(
            build(&short_h, &options()),
            Err(ConfigError::DuplicateShortOption { .. })
        ));

        let file = RecordSchema::new("Config").field(
            FieldSpec::new("file", FieldType::optional(FieldType::Path)).default(Value::Null),
        );
        assert!(build(&file, &options()).is_ok());
        let with_file = ParseOptions {
            load_from_file: true,
            ..options()
        };
        assert!(matches!(build(&file, &with_file), Err(ConfigError::ReservedName(f)) if f == "file"));
    }

    #[test]
    fn test_error_multiple_subcommands() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("action", actions()))
            .field(FieldSpec::new("second_action", actions()));
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::MultipleSubcommands(f)) if f == "second_action"
        ));
    }

    #[test]
    fn test_error_multiple_subcommands_through_nesting() {
        let holder = RecordSchema::new("Holder").field(FieldSpec::new("inner", actions()));
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("action", actions()))
            .field(FieldSpec::new("holder", FieldType::Record(holder)));
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::MultipleSubcommands(_))
        ));
    }

    #[test]
    fn test_error_duplicate_subcommand_label() {
        let schema = RecordSchema::new("Config").field(FieldSpec::new(
            "action",
            FieldType::Union(vec![
                FieldType::Record(RecordSchema::new("Run")),
                FieldType::Record(RecordSchema::new("run")),
            ]),
        ));
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::DuplicateSubcommandName { name, .. }) if name == "run"
        ));
    }

    #[test]
    fn test_error_required_positional_after_optional() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("a", FieldType::Str).default("x").positional())
            .field(FieldSpec::new("b", FieldType::Str).positional());
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::RequiredPositionalAfterOptional(f)) if f == "b"
        ));
    }

    #[test]
    fn test_error_positional_list_not_last() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("a", FieldType::list(FieldType::Str)).positional())
            .field(FieldSpec::new("b", FieldType::Str).positional());
        assert!(matches!(
            build(&schema, &options()),
            Err(ConfigError::PositionalListNotLast(f)) if f == "a"
        ));
    }

    #[test]
    fn test_generate_help_nested_group() {
        let schema = RecordSchema::new("Config")
            .field(FieldSpec::new("mode", FieldType::Str).positional())
            .field(FieldSpec::new("sub", FieldType::Record(sub_config())))
            .field(FieldSpec::new("flag", FieldType::Bool).default(false).as_flags());
        let help = generate_help(&schema, &options()).unwrap();

        assert!(help.contains("prog"), "{}", help);
        assert!(help.contains("--sub-a <SUB_A>"), "{}", help);
        assert!(help.contains("sub:"), "{}", help);
        assert!(help.contains("a string [default: abc]"), "{}", help);
        assert!(help.contains("--no-flag"), "{}", help);
    }

    #[test]
    fn test_generate_help_lists_subcommands_and_choices() {
        let schema = RecordSchema::new("Config")
            .description("My awesome tool")
            .field(FieldSpec::new("action", actions()))
            .field(
                FieldSpec::new("color", FieldType::enumeration("Color", ["red", "green"])).default("red"),
            );
        let help = generate_help(&schema, &options()).unwrap();

        assert!(help.contains("My awesome tool"), "{}", help);
        assert!(help.contains("Action1"), "{}", help);
        assert!(help.contains("action1"), "{}", help);
        assert!(help.contains("red") && help.contains("green"), "{}", help);
    }

    #[test]
    fn test_generate_usage_includes_file_option() {
        let schema = RecordSchema::new("Config").field(FieldSpec::new("a", FieldType::Int).default(5));
        let opts = ParseOptions {
            load_from_file: true,
            ..options()
        };
        let usage = generate_usage(&schema, &opts).unwrap();
        assert!(usage.contains("prog"), "{}", usage);
        let help = generate_help(&schema, &opts).unwrap();
        assert!(help.contains("--file <PATH>"), "{}", help);
    }
}
