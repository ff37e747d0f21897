use std::{ffi::OsString, process};

use crate::{assemble, build, Command, CommandDef, Error, Instance, Result, Run, FAILURE};

/// A command definition together with the parser assembled from it.
#[derive(Debug, Clone)]
pub struct Parser {
    def: CommandDef,
    cmd: clap::Command,
}

impl Parser {
    /// Assembles the parser, reporting any definition errors.
    pub fn new(def: CommandDef) -> Result<Self> {
        let cmd = assemble(&def)?;
        Ok(Self { def, cmd })
    }

    pub fn definition(&self) -> &CommandDef {
        &self.def
    }

    pub fn command(&self) -> &clap::Command {
        &self.cmd
    }

    /// Parses `args`, which do not include the program name.
    pub fn parse_vec(&self, args: Vec<OsString>) -> Result<Instance> {
        let matches = self.cmd.clone().no_binary_name(true).try_get_matches_from(args)?;
        build(&self.def, &matches)
    }

    pub fn parse_env(&self) -> Result<Instance> {
        let matches = self.cmd.clone().try_get_matches_from(std::env::args_os())?;
        build(&self.def, &matches)
    }

    /// Parses `args` and hands the instance to the definition's run behavior.
    pub fn run_vec(&self, args: Vec<OsString>) -> Result<i32> {
        let instance = self.parse_vec(args)?;
        self.run(&instance)
    }

    pub fn run(&self, instance: &Instance) -> Result<i32> {
        match &self.def.run {
            Some(run) => Ok(run(instance)),
            None => bail!("command `{}` has no run behavior", self.def.name),
        }
    }

    /// Answers a shell completion request if the environment carries one.
    ///
    /// Returns normally when the process is not being run for completion.
    #[cfg(feature = "complete")]
    pub fn complete_env(&self) {
        let cmd = self.cmd.clone();
        clap_complete::CompleteEnv::with_factory(move || cmd.clone()).complete();
    }

    /// Parses the process arguments, runs the definition's run behavior and
    /// exits with its result.
    pub fn execute(self) -> ! {
        #[cfg(feature = "complete")]
        self.complete_env();

        let code = match self.parse_env().and_then(|it| self.run(&it)) {
            Ok(code) => code,
            Err(err) => exit_on(err),
        };
        process::exit(code)
    }
}

/// Parses the process arguments into `C`, runs it and exits with its result.
pub fn execute<C: Command + Run>() -> ! {
    let parser = match Parser::new(C::definition()) {
        Ok(it) => it,
        Err(err) => exit_on(err),
    };
    #[cfg(feature = "complete")]
    parser.complete_env();

    let mut cmd = match parser.parse_env().and_then(C::from_instance) {
        Ok(it) => it,
        Err(err) => exit_on(err),
    };
    cmd.setup();
    process::exit(cmd.run())
}

fn exit_on(err: Error) -> ! {
    match err {
        Error::Parse(err) => err.exit(),
        err => {
            tracing::error!(%err, "command failed before running");
            eprintln!("error: {}", err);
            process::exit(FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, Value, SUCCESS};

    fn args(line: &str) -> Vec<OsString> {
        line.split_ascii_whitespace().map(OsString::from).collect()
    }

    #[test]
    fn run_behavior_sees_the_instance() {
        let def = CommandDef::new("full")
            .member(Field::of::<String>("filename"))
            .member(Field::of::<i64>("iterations").default(10))
            .run(|it| match it.get("iterations") {
                Some(Value::Int(n)) if *n > 0 => SUCCESS,
                _ => FAILURE,
            });
        let parser = Parser::new(def).unwrap();
        assert_eq!(parser.run_vec(args("a.txt")).unwrap(), SUCCESS);
        assert_eq!(parser.run_vec(args("a.txt --iterations 0")).unwrap(), FAILURE);
    }

    #[test]
    fn parse_failure_never_runs() {
        let def = CommandDef::new("paint")
            .member(Field::of::<String>("color").choices_listed(["red", "green", "blue"]).default("red"))
            .run(|_| panic!("must not run"));
        let parser = Parser::new(def).unwrap();
        let err = parser.run_vec(args("--color purple")).unwrap_err();
        assert_ne!(err.exit_code(), SUCCESS);
    }

    #[test]
    fn missing_run_behavior_is_misuse() {
        let parser = Parser::new(CommandDef::new("idle")).unwrap();
        let err = parser.run_vec(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: command `idle` has no run behavior");
    }
}
