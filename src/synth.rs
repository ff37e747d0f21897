//! Turns a field declaration into the option the parser gets.

use std::{ffi::OsStr, fmt};

use clap::{
    builder::{
        BoolishValueParser, PossibleValue, PossibleValuesParser, StringValueParser,
        TypedValueParser, ValueRange,
    },
    error::ErrorKind,
    ArgAction,
};

use crate::{
    classify::{classify, Kind, Scalar},
    complete, Completer, DefaultValue, Field, Result, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    ZeroOrOne,
    OneOrMore,
    ZeroOrMore,
}

impl Arity {
    fn relax(self) -> Arity {
        match self {
            Arity::One | Arity::ZeroOrOne => Arity::ZeroOrOne,
            Arity::OneOrMore | Arity::ZeroOrMore => Arity::ZeroOrMore,
        }
    }

    pub fn is_repeated(self) -> bool {
        matches!(self, Arity::OneOrMore | Arity::ZeroOrMore)
    }

    pub fn is_required(self) -> bool {
        matches!(self, Arity::One | Arity::OneOrMore)
    }

    fn num_args(self, positional: bool) -> ValueRange {
        match (self, positional) {
            (Arity::One, _) | (Arity::ZeroOrOne, true) => ValueRange::SINGLE,
            (Arity::ZeroOrOne, false) => ValueRange::new(0..=1),
            (Arity::OneOrMore, _) | (Arity::ZeroOrMore, true) => ValueRange::new(1..),
            (Arity::ZeroOrMore, false) => ValueRange::new(0..),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consume values, coercing each one.
    Store { arity: Arity, scalar: Scalar },
    StoreTrue,
    StoreFalse,
    Count,
}

/// Everything the parser needs to know about one option.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: String,
    pub positional: bool,
    pub short: Option<String>,
    pub action: Action,
    pub choices: Option<Vec<String>>,
    pub default: DefaultValue,
    pub help: String,
    pub metavar: Option<String>,
    pub completer: Option<Completer>,
}

pub fn synthesize(field: &Field) -> Result<OptionSpec> {
    if field.completer.is_some() && !complete::AVAILABLE {
        bail!(
            "field `{}` declares a completer, but shell completion is not available \
             (enable the `complete` feature)",
            field.name
        )
    }

    let class = classify(&field.ty);
    let optional = field.optional || class.optional;
    let explicit = match &field.choices {
        Some(choices) => Some(choices.resolve(&field.name)?),
        None => None,
    };

    let (action, choices) = match (field.count, class.kind) {
        (true, Kind::Scalar(Scalar::Integer)) => (counter_action(field)?, None),
        (true, _) => bail!("field `{}` counts occurrences, so it must be an integer", field.name),
        (false, Kind::Scalar(Scalar::Boolean)) => (flag_action(field)?, None),
        (false, Kind::Scalar(scalar)) => store(Arity::One, scalar, optional, explicit),
        (false, Kind::Sequence(scalar)) => store(Arity::OneOrMore, scalar, optional, explicit),
        (false, Kind::Unrecognized) => store(Arity::One, Scalar::Text, optional, explicit),
    };

    if let (Action::Store { scalar: Scalar::Integer, .. }, DefaultValue::Value(default)) =
        (&action, &field.default)
    {
        if let Some(text) = out_of_range(default) {
            bail!("field `{}` has default {}, which does not fit in an i64", field.name, text)
        }
    }

    let positional = field.default.is_missing() && matches!(action, Action::Store { .. });
    let res = OptionSpec {
        name: field.name.clone(),
        positional,
        short: if positional { None } else { field.short.clone() },
        action,
        choices,
        default: field.default.clone(),
        help: field.help.clone(),
        metavar: field.metavar.clone(),
        completer: field.completer.clone(),
    };
    tracing::debug!(option = %res, "synthesized option");
    Ok(res)
}

fn store(
    arity: Arity,
    scalar: Scalar,
    optional: bool,
    explicit: Option<Vec<String>>,
) -> (Action, Option<Vec<String>>) {
    let choices = match &scalar {
        Scalar::Enumerated(members) => Some(members.clone()),
        _ => explicit,
    };
    let arity = if optional { arity.relax() } else { arity };
    (Action::Store { arity, scalar }, choices)
}

fn flag_action(field: &Field) -> Result<Action> {
    match field.default.resolve() {
        None | Some(Value::Absent) | Some(Value::Bool(false)) => Ok(Action::StoreTrue),
        Some(Value::Bool(true)) => Ok(Action::StoreFalse),
        Some(other) => bail!(
            "flag `{}` needs a boolean default, got {}",
            field.name,
            other.type_name()
        ),
    }
}

/// Counting starts from the default.
fn counter_action(field: &Field) -> Result<Action> {
    match field.default.resolve() {
        None | Some(Value::Absent) | Some(Value::Int(_)) => Ok(Action::Count),
        Some(other) => bail!(
            "counter `{}` needs an integer default, got {}",
            field.name,
            other.type_name()
        ),
    }
}

/// Integers too large for `Value::Int` are carried as their digits.
fn out_of_range(value: &Value) -> Option<&str> {
    match value {
        Value::Text(text) => Some(text),
        Value::List(items) => items.iter().find_map(out_of_range),
        _ => None,
    }
}

impl OptionSpec {
    pub fn to_arg(&self) -> clap::Arg {
        let mut arg = clap::Arg::new(self.name.clone());
        if !self.help.is_empty() {
            arg = arg.help(self.help.clone());
        }
        if !self.positional {
            arg = arg.long(self.name.clone());
            if let Some(short) = &self.short {
                let mut chars = short.chars();
                arg = match (chars.next(), chars.next()) {
                    (Some(c), None) => arg.short(c),
                    _ => arg.visible_alias(short.clone()),
                };
            }
        }

        arg = match &self.action {
            Action::StoreTrue => arg.action(ArgAction::SetTrue).overrides_with(self.name.clone()),
            Action::StoreFalse => arg.action(ArgAction::SetFalse).overrides_with(self.name.clone()),
            Action::Count => arg.action(ArgAction::Count),
            Action::Store { arity, scalar } => {
                let action = if !self.positional && arity.is_repeated() {
                    ArgAction::Append
                } else {
                    ArgAction::Set
                };
                if !self.positional && !arity.is_repeated() {
                    arg = arg.overrides_with(self.name.clone());
                }
                let numeric = matches!(scalar, Scalar::Integer | Scalar::Float);
                arg.action(action)
                    .value_parser(Coercion { scalar: scalar.clone(), choices: self.choices.clone() })
                    .num_args(arity.num_args(self.positional))
                    .required(self.positional && arity.is_required())
                    .allow_negative_numbers(numeric)
            }
        };

        if let Some(metavar) = &self.metavar {
            arg = arg.value_name(metavar.clone());
        }
        if let Some(completer) = &self.completer {
            arg = complete::attach(arg, completer);
        }
        arg
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positional {
            write!(f, "<{}>", self.name)?;
        } else {
            write!(f, "--{}", self.name)?;
            match &self.short {
                Some(short) if short.chars().count() == 1 => write!(f, ", -{}", short)?,
                Some(short) => write!(f, ", --{}", short)?,
                None => (),
            }
        }
        match &self.action {
            Action::StoreTrue => write!(f, " store-true")?,
            Action::StoreFalse => write!(f, " store-false")?,
            Action::Count => write!(f, " count")?,
            Action::Store { arity, scalar } => {
                let arity = match arity {
                    Arity::One => "one",
                    Arity::ZeroOrOne => "zero-or-one",
                    Arity::OneOrMore => "one-or-more",
                    Arity::ZeroOrMore => "zero-or-more",
                };
                let scalar = match scalar {
                    Scalar::Text => "text",
                    Scalar::Integer => "integer",
                    Scalar::Float => "float",
                    Scalar::Boolean => "boolean",
                    Scalar::Enumerated(_) => "enumerated",
                };
                write!(f, " {} {}", arity, scalar)?;
            }
        }
        if let Some(choices) = &self.choices {
            write!(f, " choices=[{}]", choices.join(", "))?;
        }
        match &self.default {
            DefaultValue::Missing => (),
            DefaultValue::Value(Value::Absent) => write!(f, " default=none")?,
            DefaultValue::Value(it) => write!(f, " default={}", it)?,
            DefaultValue::Factory(_) => write!(f, " default=<factory>")?,
        }
        Ok(())
    }
}

/// Coerces raw tokens into `Value`s, checking the legal choices first.
#[derive(Clone)]
struct Coercion {
    scalar: Scalar,
    choices: Option<Vec<String>>,
}

impl TypedValueParser for Coercion {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        raw: &OsStr,
    ) -> Result<Value, clap::Error> {
        let text = match &self.choices {
            Some(choices) => {
                PossibleValuesParser::new(choices.iter().map(|it| PossibleValue::new(it.clone())))
                    .parse_ref(cmd, arg, raw)?
            }
            None => StringValueParser::new().parse_ref(cmd, arg, raw)?,
        };
        let res = match &self.scalar {
            Scalar::Text => Value::Text(text),
            Scalar::Enumerated(_) => Value::Member(text),
            Scalar::Boolean => Value::Bool(BoolishValueParser::new().parse_ref(cmd, arg, raw)?),
            Scalar::Integer => {
                Value::Int(text.parse::<i64>().map_err(|err| invalid(cmd, arg, &text, err))?)
            }
            Scalar::Float => {
                Value::Float(text.parse::<f64>().map_err(|err| invalid(cmd, arg, &text, err))?)
            }
        };
        Ok(res)
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        let choices = self.choices.as_ref()?;
        Some(Box::new(choices.iter().map(|it| PossibleValue::new(it.clone()))))
    }
}

fn invalid(
    cmd: &clap::Command,
    arg: Option<&clap::Arg>,
    text: &str,
    err: impl fmt::Display,
) -> clap::Error {
    let arg = arg.map(|it| it.to_string()).unwrap_or_else(|| "...".to_string());
    clap::Error::raw(ErrorKind::ValueValidation, format!("invalid value '{text}' for '{arg}': {err}\n"))
        .with_cmd(cmd)
}
