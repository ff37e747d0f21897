use argbind::{Choice, Command, Run, SUCCESS};

#[derive(Debug, Clone, Copy, Choice)]
enum Choices {
    Choice1,
    Choice2,
}

/// Description of the command
#[derive(Debug, Command)]
struct Hello {
    #[arg(help = "A positional argument")]
    positional_arg: String,
    #[arg(help = "An optional argument", default = "default value")]
    optional_arg: String,
    #[arg(help = "A flag argument", default = true, short = "f")]
    flag_arg: bool,
    #[arg(help = "A choice argument", default = Choices::Choice1, choices = Choices)]
    choice_arg: Choices,
}

impl Run for Hello {
    fn run(&mut self) -> i32 {
        println!("{:#?}", self);
        SUCCESS
    }
}

fn main() {
    argbind::execute::<Hello>()
}
