use std::path::PathBuf;

use argbind::{Choice, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Choice)]
pub enum Mode {
    Fast,
    Thorough,
}

/// Run the full pipeline.
///
/// Everything below the first paragraph stays out of the help.
#[derive(Debug, Command)]
pub struct Full {
    #[arg(help = "The filename to select")]
    pub filename: PathBuf,
    #[arg(default = Mode::Fast)]
    pub mode: Mode,
    #[arg(choices = ["red", "green", "blue"], default = "red")]
    pub color: String,
    #[arg(choices = Mode, default = "Thorough")]
    pub mode_name: String,
    #[arg(short = "n", default = 10)]
    pub iterations: i64,
    #[arg(short = "pp", default = 0.5)]
    pub ratio: f64,
    #[arg(default_factory = Vec::new)]
    pub args: Vec<String>,
    #[arg(default = None)]
    pub seed: Option<i64>,
    #[arg(count, short = "v")]
    pub verbose: u8,
    #[arg(completer = ["alpha", "beta", "gamma"], default = "alpha")]
    pub tag: String,
    #[arg(skip)]
    pub cache: Vec<String>,
}

#[derive(Debug, Command)]
pub struct Gather {
    /// Files to gather, if any
    #[arg(metavar = "FILE")]
    pub files: Option<Vec<PathBuf>>,
}
