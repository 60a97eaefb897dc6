//! Type rules: how a declared field becomes a command-line argument.

use crate::schema::{ConfigError, FieldSpec, FieldType, RecordSchema};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::builder::{PossibleValue, TypedValueParser};
use clap::error::ErrorKind;
use std::ffi::OsStr;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// A fallible string-to-value conversion, usable directly as a clap value
/// parser.
#[derive(Clone)]
pub struct Converter {
    name: String,
    func: Arc<ConvertFn>,
    choices: Vec<String>,
}

impl Converter {
    fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            choices: Vec::new(),
        }
    }

    fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted values, when the type has a closed set.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn convert(&self, input: &str) -> Result<Value, String> {
        (self.func)(input)
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("choices", &self.choices)
            .finish()
    }
}

impl TypedValueParser for Converter {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Value, clap::Error> {
        let input = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        self.convert(input).map_err(|detail| {
            let arg_name = arg
                .map(|a| a.to_string())
                .unwrap_or_else(|| "...".to_string());
            let mut message = format!(
                "argument {}: invalid {} value: '{}'",
                arg_name, self.name, input
            );
            if self.choices.is_empty() {
                message.push_str(&format!(" ({})", detail));
            } else {
                message.push_str(&format!(" (choose from {})", self.choices.join(", ")));
            }
            message.push('\n');
            clap::Error::raw(ErrorKind::ValueValidation, message).with_cmd(cmd)
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        if self.choices.is_empty() {
            return None;
        }
        Some(Box::new(
            self.choices.iter().map(|c| PossibleValue::new(c.clone())),
        ))
    }
}

/// How a field is rendered on the command line.
#[derive(Debug, Clone)]
pub enum RuleKind<'s> {
    Scalar,
    List,
    FlagPair,
    Ignored,
    NestedRecord(&'s RecordSchema),
    SubcommandUnion(Vec<&'s RecordSchema>),
}

/// Everything the builder needs to register one field.
#[derive(Debug, Clone)]
pub struct ArgumentRule<'s> {
    pub kind: RuleKind<'s>,
    pub converter: Option<Converter>,
    pub positional: bool,
    pub short: Option<char>,
    /// The field's dest: prefix plus field name, underscores kept.
    pub display_name: String,
    pub help: String,
    pub metavar: String,
    pub required: bool,
}

/// Derive the argument rule of `field`, whose full dest is `dest`.
pub fn resolve<'s>(field: &'s FieldSpec, dest: &str) -> Result<ArgumentRule<'s>, ConfigError> {
    let meta = &field.meta;
    let required = field.is_required();
    let mut rule = ArgumentRule {
        kind: RuleKind::Ignored,
        converter: None,
        positional: meta.positional,
        short: None,
        display_name: dest.to_string(),
        help: String::new(),
        metavar: meta.metavar.clone().unwrap_or_else(|| {
            if meta.positional {
                dest.to_string()
            } else {
                dest.to_uppercase()
            }
        }),
        required,
    };

    if meta.ignore_arg {
        return Ok(rule);
    }

    if let Some(ref short) = meta.short_option {
        rule.short = Some(parse_short_option(dest, short)?);
        if meta.positional {
            return Err(ConfigError::PositionalWithShortOption(dest.to_string()));
        }
    }

    let ty = field.ty.unwrap_optional();

    if meta.as_flags && !matches!(ty, FieldType::Bool) {
        return Err(ConfigError::FlagsOnNonBool(dest.to_string()));
    }

    rule.kind = if let Some(ref custom) = meta.parser {
        let custom = custom.clone();
        rule.converter = Some(Converter::new(custom.name().to_string(), move |s| {
            custom.call(s)
        }));
        if matches!(ty, FieldType::List(_)) {
            RuleKind::List
        } else {
            RuleKind::Scalar
        }
    } else {
        match ty {
            FieldType::Bool if meta.as_flags => {
                if meta.positional {
                    return Err(ConfigError::PositionalFlags(dest.to_string()));
                }
                RuleKind::FlagPair
            }
            FieldType::Record(schema) => {
                if meta.positional {
                    return Err(ConfigError::PositionalRecord(dest.to_string()));
                }
                RuleKind::NestedRecord(schema)
            }
            FieldType::Union(members) if members.iter().any(is_record) => {
                if !members.iter().all(is_record) {
                    return Err(ConfigError::MixedUnion(dest.to_string()));
                }
                let records: Vec<&RecordSchema> = members
                    .iter()
                    .filter_map(|m| match m.unwrap_optional() {
                        FieldType::Record(schema) => Some(schema),
                        _ => None,
                    })
                    .collect();
                if meta.positional {
                    return Err(ConfigError::PositionalRecord(dest.to_string()));
                }
                // A single member is just that record.
                if records.len() == 1 {
                    RuleKind::NestedRecord(records[0])
                } else {
                    RuleKind::SubcommandUnion(records)
                }
            }
            FieldType::List(element) => {
                rule.converter = Some(scalar_converter(element, field, dest)?);
                RuleKind::List
            }
            other => {
                rule.converter = Some(scalar_converter(other, field, dest)?);
                RuleKind::Scalar
            }
        }
    };

    rule.help = help_text(field, dest, &rule.kind);
    Ok(rule)
}

fn is_record(ty: &FieldType) -> bool {
    matches!(ty.unwrap_optional(), FieldType::Record(_))
}

fn parse_short_option(dest: &str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(c), None) if c.is_ascii_alphanumeric() => Ok(c),
        _ => Err(ConfigError::InvalidShortOption {
            field: dest.to_string(),
            value: value.to_string(),
        }),
    }
}

fn help_text(field: &FieldSpec, dest: &str, kind: &RuleKind<'_>) -> String {
    let base = match (&field.meta.help, kind) {
        (Some(help), _) => help.clone(),
        (None, RuleKind::FlagPair) => format!("Set {} to True.", dest),
        (None, _) => format!("Override field {}.", dest),
    };
    match (&field.default, kind) {
        (Some(default), RuleKind::Scalar | RuleKind::List | RuleKind::FlagPair) => {
            format!("{} [default: {}]", base, default)
        }
        _ => base,
    }
}

/// Converter for a type that is built from exactly one argument string.
fn scalar_converter(ty: &FieldType, field: &FieldSpec, dest: &str) -> Result<Converter, ConfigError> {
    let name = ty.display_name();
    let converter = match ty {
        FieldType::Str | FieldType::Path => Converter::new(name, |s| Ok(Value::Str(s.to_string()))),
        FieldType::Int => Converter::new(name, |s| {
            s.parse::<i64>().map(Value::Int).map_err(|e| e.to_string())
        }),
        // Non-finite floats have no JSON form.
        FieldType::Float => Converter::new(name, |s| match s.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Value::Float(x)),
            Ok(_) => Err("not a finite number".to_string()),
            Err(e) => Err(e.to_string()),
        }),
        FieldType::Bool => Converter::new(name, parse_bool),
        FieldType::Bytes => {
            let encoding = field.meta.encoding.as_deref().unwrap_or("utf-8");
            let encode = encoder(encoding).ok_or_else(|| ConfigError::UnknownEncoding {
                field: dest.to_string(),
                encoding: encoding.to_string(),
            })?;
            Converter::new(encoding, move |s| encode(s).map(Value::Bytes))
        }
        FieldType::Date => {
            let format = field.meta.date_format.clone();
            Converter::new(name, move |s| parse_date(s, format.as_deref()).map(Value::Date))
        }
        FieldType::DateTime => {
            let format = field.meta.date_format.clone();
            Converter::new(name, move |s| {
                parse_datetime(s, format.as_deref()).map(Value::DateTime)
            })
        }
        FieldType::Enum { members, .. } => {
            if members.is_empty() {
                return Err(ConfigError::EmptyChoices(dest.to_string()));
            }
            let accepted = members.clone();
            Converter::new(name, move |s| {
                accepted
                    .iter()
                    .find(|m| m.as_str() == s)
                    .map(|m| Value::Str(m.clone()))
                    .ok_or_else(|| format!("'{}' is not a member", s))
            })
            .with_choices(members.clone())
        }
        FieldType::Literal(values) => literal_converter(values, field, dest)?,
        FieldType::Optional(inner) => scalar_converter(inner, field, dest)?,
        FieldType::Union(members) => {
            let branches = members
                .iter()
                .map(|m| scalar_converter(m, field, dest))
                .collect::<Result<Vec<_>, _>>()?;
            // First branch that accepts the input wins, so a permissive
            // member swallows everything declared after it.
            Converter::new(name, move |s| {
                branches
                    .iter()
                    .find_map(|branch| branch.convert(s).ok())
                    .ok_or_else(|| format!("no union member accepts '{}'", s))
            })
        }
        FieldType::List(_) | FieldType::Record(_) => {
            return Err(ConfigError::UnsupportedType {
                field: dest.to_string(),
                ty: name,
            })
        }
    };
    Ok(converter)
}

fn literal_converter(values: &[Value], field: &FieldSpec, dest: &str) -> Result<Converter, ConfigError> {
    let first = values
        .first()
        .ok_or_else(|| ConfigError::EmptyChoices(dest.to_string()))?;
    if values.iter().any(|v| v.kind_name() != first.kind_name()) {
        return Err(ConfigError::MixedLiteral(dest.to_string()));
    }
    let element_type = match first {
        Value::Str(_) => FieldType::Str,
        Value::Int(_) => FieldType::Int,
        Value::Float(_) => FieldType::Float,
        Value::Bool(_) => FieldType::Bool,
        other => {
            return Err(ConfigError::UnsupportedType {
                field: dest.to_string(),
                ty: format!("Literal of {}", other.kind_name()),
            })
        }
    };
    let element = scalar_converter(&element_type, field, dest)?;
    let accepted = values.to_vec();
    let choices = values.iter().map(|v| v.to_string()).collect();
    Ok(Converter::new(element_type.display_name(), move |s| {
        let parsed = element.convert(s)?;
        accepted
            .iter()
            .find(|v| **v == parsed)
            .cloned()
            .ok_or_else(|| format!("'{}' is not an accepted literal", s))
    })
    .with_choices(choices))
}

fn parse_bool(s: &str) -> Result<Value, String> {
    match s {
        "True" => Ok(Value::Bool(true)),
        "False" => Ok(Value::Bool(false)),
        _ => Err(format!("expected True or False, got '{}'", s)),
    }
}

type Encoder = fn(&str) -> Result<Vec<u8>, String>;

fn encoder(encoding: &str) -> Option<Encoder> {
    match encoding.to_ascii_lowercase().replace('_', "-").as_str() {
        "utf-8" | "utf8" => Some(|s| Ok(s.as_bytes().to_vec())),
        "ascii" | "us-ascii" => Some(|s| {
            if s.is_ascii() {
                Ok(s.as_bytes().to_vec())
            } else {
                Err("not ascii".to_string())
            }
        }),
        "latin-1" | "latin1" | "iso-8859-1" => Some(|s| {
            s.chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| format!("'{}' is not latin-1", c)))
                .collect()
        }),
        _ => None,
    }
}

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offsets are accepted and dropped; the wall-clock time is kept.
const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

fn parse_date(s: &str, format: Option<&str>) -> Result<NaiveDate, String> {
    match format {
        Some(format) => NaiveDate::parse_from_str(s, format)
            .or_else(|_| NaiveDateTime::parse_from_str(s, format).map(|dt| dt.date()))
            .map_err(|e| e.to_string()),
        None => NaiveDate::parse_from_str(s, "%Y-%m-%d").or_else(|e| {
            parse_iso_datetime(s)
                .map(|dt| dt.date())
                .ok_or_else(|| e.to_string())
        }),
    }
}

fn parse_datetime(s: &str, format: Option<&str>) -> Result<NaiveDateTime, String> {
    let format = match format {
        Some(format) => format,
        None => {
            return parse_iso_datetime(s)
                .ok_or_else(|| format!("'{}' is not an ISO 8601 date or datetime", s))
        }
    };
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Ok(dt);
    }
    match NaiveDate::parse_from_str(s, format) {
        Ok(date) => midnight(date),
        Err(_) => Err(format!("'{}' does not match the date format", s)),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            ISO_OFFSET_FORMATS
                .iter()
                .find_map(|f| DateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| parse_iso_hour(s))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| midnight(d).ok())
        })
}

/// `2020-01-01T10`: an hour with no minutes.
fn parse_iso_hour(s: &str) -> Option<NaiveDateTime> {
    let (date, hour) = s.split_once(|c| c == 'T' || c == ' ')?;
    if hour.len() != 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(hour, 0, 0)
}

fn midnight(date: NaiveDate) -> Result<NaiveDateTime, String> {
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("{} has no midnight", date))
}
