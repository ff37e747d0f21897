use std::path::PathBuf;

use argbind::{Command, Subcommands};

#[derive(Debug, Command)]
#[command(name = "tool", version = "1.2.3")]
pub struct Tool {
    #[arg(count, short = "v")]
    pub verbose: u8,
    pub sub_command: Option<ToolCmd>,
}

#[derive(Debug, Subcommands)]
pub enum ToolCmd {
    Fetch(Fetch),
    AnalysisStats(AnalysisStats),
    #[command(name = "srv")]
    Server(Server),
}

/// Fetch from a remote.
#[derive(Debug, Command)]
pub struct Fetch {
    #[arg(default = "origin")]
    pub remote: String,
    #[arg]
    pub force: bool,
}

#[derive(Debug, Command)]
pub struct AnalysisStats {
    #[arg]
    pub path: PathBuf,
    #[arg]
    pub parallel: bool,
}

#[derive(Debug, Command)]
pub struct Server {
    #[arg(default)]
    pub dir: Option<PathBuf>,
    pub sub_command: Option<ServerCmd>,
}

#[derive(Debug, Subcommands)]
pub enum ServerCmd {
    Launch(Launch),
    Watch(Watch),
}

#[derive(Debug, Command)]
pub struct Launch {
    #[arg]
    pub log: bool,
}

#[derive(Debug, Command)]
pub struct Watch;
