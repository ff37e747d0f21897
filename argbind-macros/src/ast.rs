/// A struct deriving `Command`.
#[derive(Debug)]
pub(crate) struct Cmd {
    pub(crate) ident: String,
    pub(crate) name: Option<String>,
    pub(crate) doc: Option<String>,
    /// Rust expression, not necessarily a literal.
    pub(crate) version: Option<String>,
    /// `None` for a unit struct.
    pub(crate) fields: Option<Vec<Field>>,
}

#[derive(Debug)]
pub(crate) struct Field {
    pub(crate) ident: String,
    pub(crate) ty: String,
    pub(crate) doc: Option<String>,
    pub(crate) kind: FieldKind,
}

#[derive(Debug)]
pub(crate) enum FieldKind {
    Arg(Arg),
    Skip,
    /// `sub_command: Option<E>`, holding `E`.
    SubCommand(String),
}

#[derive(Debug, Default)]
pub(crate) struct Arg {
    pub(crate) help: Option<String>,
    pub(crate) short: Option<String>,
    pub(crate) choices: Option<Choices>,
    pub(crate) optional: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) count: bool,
    pub(crate) metavar: Option<String>,
    pub(crate) completer: Option<String>,
}

#[derive(Debug)]
pub(crate) enum Choices {
    /// `choices = [a, b]`, holding what is between the brackets.
    Listed(String),
    /// `choices = SomeEnum`.
    Type(String),
    Expr(String),
}

#[derive(Debug)]
pub(crate) enum DefaultValue {
    Trait,
    Expr(String),
    /// A string literal, converted with `Into`.
    Str(String),
    Factory(String),
}

/// An enum deriving `Subcommands`.
#[derive(Debug)]
pub(crate) struct Subs {
    pub(crate) ident: String,
    pub(crate) variants: Vec<SubVariant>,
}

#[derive(Debug)]
pub(crate) struct SubVariant {
    pub(crate) ident: String,
    pub(crate) name: Option<String>,
    pub(crate) ty: String,
}

/// A fieldless enum deriving `Choice`.
#[derive(Debug)]
pub(crate) struct Choice {
    pub(crate) ident: String,
    pub(crate) members: Vec<String>,
}
