use clap::ArgMatches;
use indexmap::IndexMap;

use crate::{
    synth::{synthesize, Action, OptionSpec},
    ArgType, CommandDef, Error, Member, Result, Value,
};

/// A parsed command: one value per argument plus the active sub-command.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    values: IndexMap<String, Value>,
    sub_command: Option<(String, Box<Instance>)>,
}

impl Instance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn sub_command(&self) -> Option<(&str, &Instance)> {
        self.sub_command.as_ref().map(|(name, it)| (name.as_str(), &**it))
    }

    /// Removes the value of `name` and converts it to `T`.
    pub fn take<T: ArgType>(&mut self, name: &str) -> Result<T> {
        let value = self.values.shift_remove(name).unwrap_or(Value::Absent);
        T::from_value(value).map_err(|it| Error::Conversion {
            field: name.to_string(),
            expected: it.expected,
            found: it.found,
        })
    }

    pub fn take_sub_command(&mut self) -> Option<(String, Instance)> {
        self.sub_command.take().map(|(name, it)| (name, *it))
    }
}

/// Reconstructs an instance of `def` from what the parser matched.
pub fn build(def: &CommandDef, matches: &ArgMatches) -> Result<Instance> {
    let mut values = IndexMap::new();
    for member in &def.members {
        let field = match member {
            Member::Arg(field) => field,
            Member::Shared(_) | Member::SubCommandSlot => continue,
            Member::Plain(name) => {
                bail!("field `{}` is not a command argument, did you forget `#[arg]`?", name)
            }
        };
        let spec = synthesize(field)?;
        let value = read(&spec, matches)?;
        tracing::trace!(field = %field.name, ?value, "built");
        values.insert(field.name.clone(), value);
    }

    let sub_command = match matches.subcommand() {
        Some((name, sub_matches)) => {
            let sub = match def.sub_commands.get(name) {
                Some(it) => it,
                None => bail!("command `{}` has no sub-command `{}`", def.name, name),
            };
            Some((name.to_string(), Box::new(build(sub, sub_matches)?)))
        }
        None => None,
    };

    Ok(Instance { name: def.name.clone(), values, sub_command })
}

fn read(spec: &OptionSpec, matches: &ArgMatches) -> Result<Value> {
    let id = spec.name.as_str();
    let res = match &spec.action {
        Action::StoreTrue | Action::StoreFalse => {
            Value::Bool(matches.try_get_one::<bool>(id).map_err(misread)?.copied().unwrap_or(false))
        }
        Action::Count => {
            let start = match spec.default.resolve() {
                Some(Value::Int(it)) => it,
                _ => 0,
            };
            let seen = matches.try_get_one::<u8>(id).map_err(misread)?.copied().unwrap_or(0);
            Value::Int(start.saturating_add(seen.into()))
        }
        Action::Store { arity, .. } => {
            if matches.value_source(id).is_none() {
                return Ok(spec.default.resolve().unwrap_or(Value::Absent));
            }
            let mut given = matches
                .try_get_many::<Value>(id)
                .map_err(misread)?
                .map(|it| it.cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            if !arity.is_repeated() {
                given.pop().unwrap_or(Value::Absent)
            } else if given.is_empty() {
                Value::Absent
            } else {
                Value::List(given)
            }
        }
    };
    Ok(res)
}

fn misread(err: clap::parser::MatchesError) -> Error {
    format_err!("{}", err)
}
