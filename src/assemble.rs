use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use crate::{
    synth::{synthesize, Action},
    Field, Instance, Member, Result,
};

pub type RunFn = Arc<dyn Fn(&Instance) -> i32 + Send + Sync>;

/// One level of a command line: its arguments and the sub-commands below it.
#[derive(Clone)]
pub struct CommandDef {
    pub name: String,
    pub about: Option<String>,
    pub version: Option<String>,
    /// In declaration order, which is also the positional order.
    pub members: Vec<Member>,
    pub sub_commands: Registry,
    pub run: Option<RunFn>,
}

impl CommandDef {
    pub fn new(name: impl Into<String>) -> CommandDef {
        CommandDef {
            name: name.into(),
            about: None,
            version: None,
            members: Vec::new(),
            sub_commands: Registry::new(),
            run: None,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> CommandDef {
        self.about = Some(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> CommandDef {
        self.version = Some(version.into());
        self
    }

    pub fn member(mut self, member: impl Into<Member>) -> CommandDef {
        self.members.push(member.into());
        self
    }

    pub fn sub_commands(mut self, registry: Registry) -> CommandDef {
        self.sub_commands = registry;
        self
    }

    pub fn sub_command(mut self, name: impl Into<String>, def: CommandDef) -> CommandDef {
        self.sub_commands.register(name, def);
        self
    }

    pub fn run<F>(mut self, f: F) -> CommandDef
    where
        F: Fn(&Instance) -> i32 + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(f));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.members.iter().filter_map(|it| match it {
            Member::Arg(field) => Some(field),
            _ => None,
        })
    }
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("version", &self.version)
            .field("members", &self.members)
            .field("sub_commands", &self.sub_commands)
            .finish_non_exhaustive()
    }
}

/// Sub-command definitions by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<(String, CommandDef)>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers `def` under `name`, which becomes the definition's name.
    pub fn register(&mut self, name: impl Into<String>, mut def: CommandDef) {
        def.name = name.into();
        self.entries.push((def.name.clone(), def));
    }

    pub fn get(&self, name: &str) -> Option<&CommandDef> {
        self.entries.iter().find(|(it, _)| it == name).map(|(_, def)| def)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandDef)> {
        self.entries.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the parser for `def` and, recursively, for its sub-commands.
pub fn assemble(def: &CommandDef) -> Result<clap::Command> {
    let mut cmd = clap::Command::new(def.name.clone());
    if let Some(about) = &def.about {
        cmd = cmd.about(about.clone());
    }
    if let Some(version) = &def.version {
        cmd = cmd.version(version.clone());
    }

    let mut flags = Flags::new(def);
    let mut names = HashSet::new();
    let mut open_positional: Option<&str> = None;
    let mut optional_positional: Option<&str> = None;
    for member in &def.members {
        let field = match member {
            Member::Arg(field) => field,
            Member::Shared(_) | Member::SubCommandSlot => continue,
            Member::Plain(name) => {
                bail!("field `{}` is not a command argument, did you forget `#[arg]`?", name)
            }
        };
        if !names.insert(field.name.as_str()) {
            bail!("command `{}` declares `{}` more than once", def.name, field.name)
        }

        let spec = synthesize(field)?;
        flags.claim(&spec.name, format!("--{}", spec.name))?;
        match spec.short.as_deref() {
            Some(short) if short.chars().count() == 1 => flags.claim(&spec.name, format!("-{short}"))?,
            Some(short) => flags.claim(&spec.name, format!("--{short}"))?,
            None => (),
        }

        if spec.positional {
            if let Some(prev) = open_positional {
                bail!("positional `{}` follows `{}`, which takes any number of values", spec.name, prev)
            }
            if let Action::Store { arity, .. } = &spec.action {
                if arity.is_required() {
                    if let Some(prev) = optional_positional {
                        bail!("positional `{}` is required, but follows optional `{}`", spec.name, prev)
                    }
                } else {
                    optional_positional.get_or_insert(field.name.as_str());
                }
                if arity.is_repeated() {
                    open_positional = Some(field.name.as_str());
                }
            }
        }
        cmd = cmd.arg(spec.to_arg());
    }

    if !def.sub_commands.is_empty() {
        cmd = cmd.subcommand_required(false).disable_help_subcommand(true);
        let mut names = HashSet::new();
        for (name, sub) in def.sub_commands.iter() {
            if !names.insert(name) {
                bail!("command `{}` registers sub-command `{}` more than once", def.name, name)
            }
            cmd = cmd.subcommand(assemble(sub)?);
        }
    }

    tracing::debug!(
        command = %def.name,
        args = cmd.get_arguments().count(),
        sub_commands = def.sub_commands.len(),
        "assembled command"
    );
    Ok(cmd)
}

/// Flag spellings taken on one level, including the ones clap adds itself.
struct Flags {
    owners: HashMap<String, String>,
}

impl Flags {
    fn new(def: &CommandDef) -> Flags {
        let mut owners = HashMap::new();
        for flag in ["-h", "--help"] {
            owners.insert(flag.to_string(), "the built-in help flag".to_string());
        }
        if def.version.is_some() {
            for flag in ["-V", "--version"] {
                owners.insert(flag.to_string(), "the built-in version flag".to_string());
            }
        }
        Flags { owners }
    }

    fn claim(&mut self, field: &str, flag: String) -> Result<()> {
        if let Some(owner) = self.owners.get(&flag) {
            bail!("field `{}` clashes with {} over `{}`", field, owner, flag)
        }
        self.owners.insert(flag, format!("field `{field}`"));
        Ok(())
    }
}
