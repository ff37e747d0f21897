use argbind::{Command, Run, FAILURE, SUCCESS};

/// Print a report.
#[derive(Debug, Command)]
pub struct Report {
    #[arg(help = "The file to read")]
    pub filename: String,
    /// Debug mode
    #[arg(default = true, short = "d")]
    pub debug: bool,
}

impl Run for Report {
    fn run(&mut self) -> i32 {
        if self.filename.is_empty() {
            FAILURE
        } else {
            SUCCESS
        }
    }
}
