//! Every kind of argument in one command.
//!
//! Try `RUST_LOG=argbind=debug cargo run --example full -- Cargo.toml -n 3 -vv`,
//! or source `COMPLETE=bash cargo run --example full` for completions.

use std::path::PathBuf;

use argbind::{Choice, Command, Run, FAILURE, SUCCESS};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Choice)]
enum Choices {
    Choice1,
    Choice2,
    Choice3,
}

#[derive(Debug, Command)]
struct Full {
    #[arg(help = "The filename to select")]
    filename: PathBuf,
    #[arg(help = "Set the command into debug mode", default = true)]
    debug: bool,
    #[arg(help = "Some choice to make", default = Choices::Choice1)]
    choices: Choices,
    #[arg(help = "The number of iterations", short = "n", default = 10)]
    iterations: u32,
    #[arg(default_factory = Vec::new)]
    args: Vec<String>,
    #[arg(default = None)]
    seed: Option<i64>,
    #[arg(default = None, completer = ["test_base", "test_spi", "test_i2c"])]
    test: Option<String>,
    /// Print more, repeat for even more
    #[arg(count, short = "v")]
    verbose: u8,
}

impl Run for Full {
    fn setup(&mut self) {
        if self.debug {
            tracing::debug!(seed = ?self.seed, "debug mode");
        }
    }

    fn run(&mut self) -> i32 {
        if !self.filename.exists() {
            eprintln!("invalid path: {}", self.filename.display());
            return FAILURE;
        }
        for _ in 0..self.verbose {
            println!("{:#?}", self);
        }
        SUCCESS
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
    argbind::execute::<Full>()
}
