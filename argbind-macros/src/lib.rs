mod ast;
mod emit;
mod parse;

#[cfg(not(test))]
#[proc_macro_derive(Command, attributes(arg, command))]
pub fn derive_command(ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let text = match parse::command(ts) {
        Ok(cmd) => emit::command(&cmd),
        Err(err) => emit::error(&err.to_string()),
    };
    text.parse().unwrap()
}

#[cfg(not(test))]
#[proc_macro_derive(Subcommands, attributes(command))]
pub fn derive_subcommands(ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let text = match parse::subcommands(ts) {
        Ok(subs) => emit::subcommands(&subs),
        Err(err) => emit::error(&err.to_string()),
    };
    text.parse().unwrap()
}

#[cfg(not(test))]
#[proc_macro_derive(Choice)]
pub fn derive_choice(ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let text = match parse::choice(ts) {
        Ok(choice) => emit::choice(&choice),
        Err(err) => emit::error(&err.to_string()),
    };
    text.parse().unwrap()
}

#[cfg(test)]
pub fn compile(derive: &str, src: &str) -> String {
    use proc_macro2::TokenStream;

    let ts = src.parse::<TokenStream>().unwrap();
    let res = match derive {
        "Command" => parse::command(ts).map(|it| emit::command(&it)),
        "Subcommands" => parse::subcommands(ts).map(|it| emit::subcommands(&it)),
        "Choice" => parse::choice(ts).map(|it| emit::choice(&it)),
        _ => panic!("unknown derive {}", derive),
    };
    res.unwrap_or_else(|err| emit::error(&err.to_string()))
}
