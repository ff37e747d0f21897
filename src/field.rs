use std::{fmt, sync::Arc};

use crate::{ArgType, Completer, Result, TypeExpr, Value};

/// Where a field without a command-line value gets one from.
#[derive(Clone)]
pub enum DefaultValue {
    /// No default: the field is a required positional argument.
    Missing,
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, DefaultValue::Missing)
    }

    /// Produces the default, running the factory if there is one.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            DefaultValue::Missing => None,
            DefaultValue::Value(it) => Some(it.clone()),
            DefaultValue::Factory(f) => Some(f()),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Missing => f.write_str("Missing"),
            DefaultValue::Value(it) => f.debug_tuple("Value").field(it).finish(),
            DefaultValue::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// An explicit set of legal values for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Choices {
    /// Should be a `Value::List`; anything else is rejected at definition time.
    Listed(Value),
    /// Should be an enumeration type; anything else is rejected at definition time.
    Type(TypeExpr),
}

impl Choices {
    pub(crate) fn resolve(&self, field: &str) -> Result<Vec<String>> {
        match self {
            Choices::Listed(Value::List(items)) => Ok(items.iter().map(|it| it.to_string()).collect()),
            Choices::Type(TypeExpr::Enum(it)) => Ok(it.members.clone()),
            _ => bail!(
                "field `{}` has an invalid type for choices, did you use an enumeration or a list?",
                field
            ),
        }
    }
}

/// A single declared command-line argument.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub help: String,
    pub short: Option<String>,
    pub choices: Option<Choices>,
    pub optional: bool,
    pub default: DefaultValue,
    pub count: bool,
    pub metavar: Option<String>,
    pub completer: Option<Completer>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Field {
        Field {
            name: name.into(),
            ty,
            help: String::new(),
            short: None,
            choices: None,
            optional: false,
            default: DefaultValue::Missing,
            count: false,
            metavar: None,
            completer: None,
        }
    }

    /// Declares a field backed by the Rust type `T`.
    pub fn of<T: ArgType>(name: impl Into<String>) -> Field {
        Field::new(name, T::type_expr())
    }

    pub fn help(mut self, help: impl Into<String>) -> Field {
        self.help = help.into();
        self
    }

    pub fn short(mut self, short: impl Into<String>) -> Field {
        self.short = Some(short.into());
        self
    }

    pub fn choices(mut self, choices: Choices) -> Field {
        self.choices = Some(choices);
        self
    }

    pub fn choices_listed<I, V>(self, items: I) -> Field
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices(Choices::Listed(Value::List(items.into_iter().map(Into::into).collect())))
    }

    pub fn choices_of<T: ArgType>(self) -> Field {
        self.choices(Choices::Type(T::type_expr()))
    }

    pub fn optional(mut self) -> Field {
        self.optional = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Field {
        self.default = DefaultValue::Value(value.into());
        self
    }

    pub fn default_factory<F>(mut self, factory: F) -> Field
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = DefaultValue::Factory(Arc::new(factory));
        self
    }

    pub fn count(mut self) -> Field {
        self.count = true;
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Field {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn completer(mut self, completer: impl Into<Completer>) -> Field {
        self.completer = Some(completer.into());
        self
    }
}

/// A member of a command struct, as the assembler sees it.
#[derive(Debug, Clone)]
pub enum Member {
    Arg(Field),
    /// State shared by the command, never exposed on the command line.
    Shared(String),
    /// The reserved slot holding the active sub-command.
    SubCommandSlot,
    /// A member that was not declared as an argument.
    Plain(String),
}

impl From<Field> for Member {
    fn from(field: Field) -> Member {
        Member::Arg(field)
    }
}
