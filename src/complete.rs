//! Shell completion hooks.
//!
//! Hooks are plain data attached to a field. With the `complete` feature they
//! are handed to `clap_complete`'s dynamic engine; without it, declaring one is
//! a definition error.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub help: Option<String>,
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Candidate {
        Candidate { value: value.into(), help: None }
    }

    pub fn help(mut self, help: impl Into<String>) -> Candidate {
        self.help = Some(help.into());
        self
    }
}

/// Source of completion candidates for one option.
#[derive(Clone)]
pub enum Completer {
    Values(Vec<String>),
    /// Value and its description.
    Described(Vec<(String, String)>),
    /// Called with the partially typed value.
    Dynamic(Arc<dyn Fn(&str) -> Vec<Candidate> + Send + Sync>),
}

impl Completer {
    pub fn dynamic<F>(f: F) -> Completer
    where
        F: Fn(&str) -> Vec<Candidate> + Send + Sync + 'static,
    {
        Completer::Dynamic(Arc::new(f))
    }

    pub fn described<I, K, V>(pairs: I) -> Completer
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Completer::Described(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Candidates matching `prefix`.
    ///
    /// Static candidates are filtered here; a dynamic hook gets the prefix and
    /// is trusted to filter on its own.
    pub fn candidates(&self, prefix: &str) -> Vec<Candidate> {
        match self {
            Completer::Values(values) => values
                .iter()
                .filter(|it| it.starts_with(prefix))
                .map(|it| Candidate::new(it.as_str()))
                .collect(),
            Completer::Described(pairs) => pairs
                .iter()
                .filter(|(value, _)| value.starts_with(prefix))
                .map(|(value, help)| Candidate::new(value.as_str()).help(help.as_str()))
                .collect(),
            Completer::Dynamic(f) => f(prefix),
        }
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completer::Values(it) => f.debug_tuple("Values").field(it).finish(),
            Completer::Described(it) => f.debug_tuple("Described").field(it).finish(),
            Completer::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for Completer {
    fn from(values: Vec<S>) -> Completer {
        Completer::Values(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Completer {
    fn from(values: [S; N]) -> Completer {
        Completer::Values(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<IndexMap<K, V>> for Completer {
    fn from(pairs: IndexMap<K, V>) -> Completer {
        Completer::described(pairs)
    }
}

pub(crate) const AVAILABLE: bool = cfg!(feature = "complete");

#[cfg(feature = "complete")]
pub(crate) fn attach(arg: clap::Arg, completer: &Completer) -> clap::Arg {
    use clap_complete::engine::{ArgValueCompleter, CompletionCandidate};

    let completer = completer.clone();
    arg.add(ArgValueCompleter::new(move |current: &std::ffi::OsStr| {
        let prefix = current.to_string_lossy();
        completer
            .candidates(&prefix)
            .into_iter()
            .map(|it| CompletionCandidate::new(it.value).help(it.help.map(Into::into)))
            .collect::<Vec<_>>()
    }))
}

#[cfg(not(feature = "complete"))]
pub(crate) fn attach(arg: clap::Arg, _completer: &Completer) -> clap::Arg {
    arg
}
