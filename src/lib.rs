//! Declarative command definitions on top of clap.
//!
//! A struct deriving [`Command`] is both the typed container for a command's
//! arguments and the source of its parser: every field is classified by its
//! Rust type and becomes a positional argument, a named option, a flag or a
//! counter. Nested sub-commands hang off a reserved `sub_command` field.
//!
//! ```ignore
//! #[derive(argbind::Command)]
//! /// Print a report.
//! struct Report {
//!     #[arg(help = "The file to read")]
//!     filename: String,
//!     #[arg(help = "Debug mode", default = true, short = "d")]
//!     debug: bool,
//! }
//!
//! impl argbind::Run for Report {
//!     fn run(&mut self) -> i32 {
//!         argbind::SUCCESS
//!     }
//! }
//!
//! fn main() {
//!     argbind::execute::<Report>()
//! }
//! ```
//!
//! The same machinery is available without the derives: build a
//! [`CommandDef`] out of [`Field`]s and hand it to a [`Parser`].

macro_rules! format_err {
    ($($tt:tt)*) => {
        $crate::Error::InvalidArgument(format!($($tt)*))
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

mod assemble;
mod build;
mod classify;
mod complete;
mod field;
mod rt;
mod synth;
mod ty;
mod value;

pub use argbind_macros::{Choice, Command, Subcommands};

pub use crate::{
    assemble::{assemble, CommandDef, Registry, RunFn},
    build::{build, Instance},
    classify::{classify, Classification, Kind, Scalar},
    complete::{Candidate, Completer},
    field::{Choices, DefaultValue, Field, Member},
    rt::{execute, Parser},
    synth::{synthesize, Action, Arity, OptionSpec},
    ty::{ArgType, EnumType, Mismatch, TypeExpr},
    value::Value,
};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command definition itself is wrong.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The command line does not match the definition.
    #[error(transparent)]
    Parse(#[from] clap::Error),
    #[error("can't build `{field}`: expected {expected}, found {found:?}")]
    Conversion { field: String, expected: String, found: Value },
}

impl Error {
    /// The process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Parse(err) => err.exit_code(),
            Error::InvalidArgument(_) | Error::Conversion { .. } => FAILURE,
        }
    }
}

/// A command whose parser and container come from one struct definition.
///
/// Implemented by `#[derive(Command)]`.
pub trait Command: Sized {
    fn definition() -> CommandDef;

    fn from_instance(instance: Instance) -> Result<Self>;

    /// Parses `args`, which do not include the program name.
    fn from_vec(args: Vec<std::ffi::OsString>) -> Result<Self> {
        let parser = Parser::new(Self::definition())?;
        Self::from_instance(parser.parse_vec(args)?)
    }

    fn from_env() -> Result<Self> {
        let parser = Parser::new(Self::definition())?;
        Self::from_instance(parser.parse_env()?)
    }
}

/// The set of sub-commands a command can dispatch to.
///
/// Implemented by `#[derive(Subcommands)]`.
pub trait Subcommands: Sized {
    fn registry() -> Registry;

    fn from_instance(name: &str, instance: Instance) -> Result<Self>;
}

/// What a command does once it is built.
pub trait Run {
    /// Called after construction, before `run`.
    fn setup(&mut self) {}

    /// Returns the process exit code.
    fn run(&mut self) -> i32;
}
