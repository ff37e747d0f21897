use std::{fmt, mem};

#[cfg(not(test))]
use proc_macro::{Delimiter, TokenStream, TokenTree};
#[cfg(test)]
use proc_macro2::{Delimiter, TokenStream, TokenTree};

use crate::ast;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) struct Error {
    msg: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

macro_rules! format_err {
    ($($tt:tt)*) => {
        Error { msg: format!($($tt)*) }
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

pub(crate) fn command(ts: TokenStream) -> Result<ast::Cmd> {
    let mut p = Parser::new(ts);
    let attrs = attrs(&mut p)?;
    vis(&mut p);
    p.expect_keyword("struct")?;
    let ident = p.expect_ident()?;
    if p.at_punct('<') || p.at_keyword("where") {
        bail!("`{}` can't be generic", ident)
    }

    let mut res =
        ast::Cmd { ident, name: None, doc: doc_text(&attrs.doc), version: None, fields: None };
    for meta in attrs.command.unwrap_or_default() {
        match meta.key.as_str() {
            "name" => res.name = Some(meta.string()?),
            "about" => res.doc = Some(meta.string()?),
            "version" => res.version = Some(meta.expr()?),
            key => bail!("unknown command attribute `{}`", key),
        }
    }

    if p.at_delim(Delimiter::Brace) {
        p.enter_delim(Delimiter::Brace)?;
        let mut fields = Vec::new();
        while !p.end() {
            fields.push(field(&mut p)?);
        }
        p.exit_delim()?;
        res.fields = Some(fields);
    } else if !p.eat_punct(';') {
        bail!("`{}` must be a struct with named fields", res.ident)
    }
    Ok(res)
}

pub(crate) fn subcommands(ts: TokenStream) -> Result<ast::Subs> {
    let mut p = Parser::new(ts);
    let ident = enum_header(&mut p)?;
    let mut variants = Vec::new();
    while !p.end() {
        let attrs = attrs(&mut p)?;
        let variant = p.expect_ident()?;
        if !p.at_delim(Delimiter::Parenthesis) {
            bail!("sub-command `{}::{}` must wrap one `Command` type", ident, variant)
        }
        p.enter_delim(Delimiter::Parenthesis)?;
        let ty = p.take_until_comma();
        if ty.is_empty() || !p.end() {
            bail!("sub-command `{}::{}` must wrap one `Command` type", ident, variant)
        }
        p.exit_delim()?;
        p.eat_punct(',');

        let mut name = None;
        for meta in attrs.command.unwrap_or_default() {
            match meta.key.as_str() {
                "name" => name = Some(meta.string()?),
                key => bail!("unknown sub-command attribute `{}`", key),
            }
        }
        variants.push(ast::SubVariant { ident: variant, name, ty: text(&ty) });
    }
    p.exit_delim()?;
    Ok(ast::Subs { ident, variants })
}

pub(crate) fn choice(ts: TokenStream) -> Result<ast::Choice> {
    let mut p = Parser::new(ts);
    let ident = enum_header(&mut p)?;
    let mut members = Vec::new();
    while !p.end() {
        attrs(&mut p)?;
        let variant = p.expect_ident()?;
        if p.at_delim(Delimiter::Parenthesis) || p.at_delim(Delimiter::Brace) {
            bail!("`{}::{}` has fields, only unit variants can be choices", ident, variant)
        }
        if p.eat_punct('=') {
            p.take_until_comma();
        } else {
            p.eat_punct(',');
        }
        members.push(variant);
    }
    p.exit_delim()?;
    if members.is_empty() {
        bail!("`{}` has no variants to choose from", ident)
    }
    Ok(ast::Choice { ident, members })
}

/// Parses up to and including the opening brace of an enum.
fn enum_header(p: &mut Parser) -> Result<String> {
    attrs(p)?;
    vis(p);
    p.expect_keyword("enum")?;
    let ident = p.expect_ident()?;
    if p.at_punct('<') || p.at_keyword("where") {
        bail!("`{}` can't be generic", ident)
    }
    p.enter_delim(Delimiter::Brace)?;
    Ok(ident)
}

fn field(p: &mut Parser) -> Result<ast::Field> {
    let attrs = attrs(p)?;
    vis(p);
    let ident = p.expect_ident()?;
    p.expect_punct(':')?;
    let ty = p.take_until_comma();
    if ty.is_empty() {
        bail!("expected a type for `{}`", ident)
    }

    let kind = if ident == "sub_command" {
        if attrs.arg.is_some() {
            bail!("`sub_command` holds sub-commands and can't be an `#[arg]`")
        }
        ast::FieldKind::SubCommand(option_inner(&ty)?)
    } else {
        match attrs.arg {
            Some(metas) => arg(metas)?,
            None => bail!(
                "field `{}` is not a command argument, did you forget `#[arg]`?",
                ident.trim_start_matches("r#")
            ),
        }
    };
    Ok(ast::Field { ident, ty: text(&ty), doc: doc_text(&attrs.doc), kind })
}

fn arg(metas: Vec<Meta>) -> Result<ast::FieldKind> {
    let mut res = ast::Arg::default();
    let mut skip = false;
    for meta in metas {
        match meta.key.as_str() {
            "skip" => {
                meta.flag()?;
                skip = true;
            }
            "help" => res.help = Some(meta.string()?),
            "short" => res.short = Some(meta.string()?),
            "metavar" => res.metavar = Some(meta.string()?),
            "optional" => {
                meta.flag()?;
                res.optional = true;
            }
            "count" => {
                meta.flag()?;
                res.count = true;
            }
            "default" | "default_factory" => {
                if res.default.is_some() {
                    bail!("`default` and `default_factory` can't both be given")
                }
                let default = match (meta.key.as_str(), meta.value.as_deref()) {
                    ("default", None) => ast::DefaultValue::Trait,
                    ("default", Some([TokenTree::Literal(lit)])) if is_str(&lit.to_string()) => {
                        ast::DefaultValue::Str(lit.to_string())
                    }
                    ("default", Some(value)) => ast::DefaultValue::Expr(text(value)),
                    _ => ast::DefaultValue::Factory(meta.expr()?),
                };
                res.default = Some(default);
            }
            "choices" => res.choices = Some(choices(&meta)?),
            "completer" => res.completer = Some(meta.expr()?),
            key => bail!("unknown argument attribute `{}`", key),
        }
    }
    Ok(if skip { ast::FieldKind::Skip } else { ast::FieldKind::Arg(res) })
}

fn choices(meta: &Meta) -> Result<ast::Choices> {
    let value = match meta.value.as_deref() {
        Some(it) => it,
        None => bail!("`choices` expects a list, an enum type or an expression"),
    };
    let res = match value {
        [TokenTree::Group(g)] if g.delimiter() == Delimiter::Bracket => {
            ast::Choices::Listed(g.stream().to_string())
        }
        _ if is_type_path(value) => ast::Choices::Type(text(value)),
        _ => ast::Choices::Expr(text(value)),
    };
    Ok(res)
}

/// `Color` or `crate::Color`, but not a `COLORS` constant.
fn is_type_path(tokens: &[TokenTree]) -> bool {
    let mut last = None;
    for tt in tokens {
        match tt {
            TokenTree::Ident(ident) => last = Some(ident.to_string()),
            TokenTree::Punct(p) if p.as_char() == ':' => (),
            _ => return false,
        }
    }
    match last {
        Some(name) => name.chars().any(|c| c.is_ascii_lowercase()),
        None => false,
    }
}

fn option_inner(ty: &[TokenTree]) -> Result<String> {
    match ty {
        [TokenTree::Ident(option), TokenTree::Punct(lt), inner @ .., TokenTree::Punct(gt)]
            if option.to_string() == "Option"
                && lt.as_char() == '<'
                && gt.as_char() == '>'
                && !inner.is_empty() =>
        {
            Ok(text(inner))
        }
        _ => bail!("`sub_command` must be an `Option` of a `Subcommands` enum"),
    }
}

#[derive(Default)]
struct Attrs {
    doc: Vec<String>,
    arg: Option<Vec<Meta>>,
    command: Option<Vec<Meta>>,
}

/// `key` or `key = value` inside `#[arg(..)]` or `#[command(..)]`.
struct Meta {
    key: String,
    value: Option<Vec<TokenTree>>,
}

impl Meta {
    fn string(&self) -> Result<String> {
        match self.value.as_deref() {
            Some([TokenTree::Literal(lit)]) => match unquote(&lit.to_string()) {
                Some(it) => Ok(it),
                None => bail!("`{}` expects a string literal", self.key),
            },
            _ => bail!("`{}` expects a string literal", self.key),
        }
    }

    fn expr(&self) -> Result<String> {
        match &self.value {
            Some(value) => Ok(text(value)),
            None => bail!("`{}` expects a value", self.key),
        }
    }

    fn flag(&self) -> Result<()> {
        if self.value.is_some() {
            bail!("`{}` takes no value", self.key)
        }
        Ok(())
    }
}

fn attrs(p: &mut Parser) -> Result<Attrs> {
    let mut res = Attrs::default();
    while p.eat_punct('#') {
        p.enter_delim(Delimiter::Bracket)?;
        let name = p.expect_ident()?;
        match name.as_str() {
            "doc" if p.at_punct('=') => {
                p.expect_punct('=')?;
                let line = p.expect_string()?;
                res.doc.push(line);
            }
            "arg" | "command" => {
                let mut metas = Vec::new();
                if p.at_delim(Delimiter::Parenthesis) {
                    p.enter_delim(Delimiter::Parenthesis)?;
                    metas = meta_list(p)?;
                    p.exit_delim()?;
                }
                let slot = if name == "arg" { &mut res.arg } else { &mut res.command };
                slot.get_or_insert_with(Vec::new).extend(metas);
            }
            _ => p.skip_rest(),
        }
        p.exit_delim()?;
    }
    Ok(res)
}

fn meta_list(p: &mut Parser) -> Result<Vec<Meta>> {
    let mut res = Vec::new();
    while !p.end() {
        let key = p.expect_ident()?;
        let value = if p.eat_punct('=') {
            let value = p.take_until_comma();
            if value.is_empty() {
                bail!("expected a value for `{}`", key)
            }
            Some(value)
        } else {
            if !p.end() {
                p.expect_punct(',')?;
            }
            None
        };
        res.push(Meta { key, value });
    }
    Ok(res)
}

fn vis(p: &mut Parser) {
    if p.eat_keyword("pub") && p.at_delim(Delimiter::Parenthesis) {
        p.ts.pop();
    }
}

/// The first paragraph of a doc comment, joined into one line.
fn doc_text(lines: &[String]) -> Option<String> {
    let mut res = String::new();
    for line in lines.iter().map(|it| it.trim()) {
        if line.is_empty() {
            if res.is_empty() {
                continue;
            }
            break;
        }
        if !res.is_empty() {
            res.push(' ');
        }
        res.push_str(line);
    }
    if res.is_empty() {
        None
    } else {
        Some(res)
    }
}

fn text(tokens: &[TokenTree]) -> String {
    tokens.iter().cloned().collect::<TokenStream>().to_string()
}

fn is_str(lit: &str) -> bool {
    lit.starts_with('"') || lit.starts_with("r\"") || lit.starts_with("r#")
}

/// The value of a string or char literal, as written in source.
fn unquote(lit: &str) -> Option<String> {
    if let Some(rest) = lit.strip_prefix('r') {
        let hashes = rest.len() - rest.trim_start_matches('#').len();
        let closing = format!("\"{}", "#".repeat(hashes));
        let body = rest[hashes..].strip_prefix('"')?.strip_suffix(closing.as_str())?;
        return Some(body.to_string());
    }

    let quote = lit.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let body = lit.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut res = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }
        match chars.next()? {
            'n' => res.push('\n'),
            'r' => res.push('\r'),
            't' => res.push('\t'),
            '0' => res.push('\0'),
            c @ ('\\' | '"' | '\'') => res.push(c),
            '\n' => {
                let rest = chars.as_str().trim_start();
                chars = rest.chars();
            }
            'x' => {
                let rest = chars.as_str();
                let code = u8::from_str_radix(rest.get(..2)?, 16).ok()?;
                res.push(char::from(code));
                chars = rest[2..].chars();
            }
            'u' => {
                let rest = chars.as_str().strip_prefix('{')?;
                let end = rest.find('}')?;
                let code = u32::from_str_radix(&rest[..end].replace('_', ""), 16).ok()?;
                res.push(char::from_u32(code)?);
                chars = rest[end + 1..].chars();
            }
            _ => return None,
        }
    }
    Some(res)
}

struct Parser {
    stack: Vec<Vec<TokenTree>>,
    ts: Vec<TokenTree>,
}

impl Parser {
    fn new(ts: TokenStream) -> Self {
        let mut ts = ts.into_iter().collect::<Vec<_>>();
        ts.reverse();
        Self { stack: Vec::new(), ts }
    }

    fn at_delim(&mut self, delimiter: Delimiter) -> bool {
        match self.ts.last() {
            Some(TokenTree::Group(g)) => g.delimiter() == delimiter,
            _ => false,
        }
    }
    fn enter_delim(&mut self, delimiter: Delimiter) -> Result<()> {
        match self.ts.pop() {
            Some(TokenTree::Group(g)) if g.delimiter() == delimiter => {
                let mut ts = g.stream().into_iter().collect::<Vec<_>>();
                ts.reverse();
                let ts = mem::replace(&mut self.ts, ts);
                self.stack.push(ts);
            }
            _ => bail!("expected `{}`", open(delimiter)),
        }
        Ok(())
    }
    fn exit_delim(&mut self) -> Result<()> {
        if !self.end() {
            let next = self.ts.pop().map(|it| it.to_string()).unwrap_or_default();
            bail!("unexpected `{}`", next)
        }
        match self.stack.pop() {
            Some(ts) => self.ts = ts,
            None => bail!("unbalanced delimiters"),
        }
        Ok(())
    }
    fn end(&mut self) -> bool {
        self.ts.last().is_none()
    }
    fn skip_rest(&mut self) {
        self.ts.clear();
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if !self.eat_keyword(kw) {
            bail!("expected `{}`", kw)
        }
        Ok(())
    }
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_keyword(&mut self, kw: &str) -> bool {
        match self.ts.last() {
            Some(TokenTree::Ident(ident)) => ident.to_string() == kw,
            _ => false,
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Ident(ident)) => Ok(ident.to_string()),
            next => {
                let next = next.map(|it| it.to_string()).unwrap_or_default();
                bail!("expected an identifier, got `{}`", next)
            }
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<()> {
        if !self.eat_punct(punct) {
            bail!("expected `{}`", punct)
        }
        Ok(())
    }
    fn eat_punct(&mut self, punct: char) -> bool {
        if self.at_punct(punct) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_punct(&mut self, punct: char) -> bool {
        match self.ts.last() {
            Some(TokenTree::Punct(p)) => p.as_char() == punct,
            _ => false,
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Literal(lit)) => match unquote(&lit.to_string()) {
                Some(it) => Ok(it),
                None => bail!("expected a string, got `{}`", lit),
            },
            _ => bail!("expected a string"),
        }
    }

    /// Takes tokens up to the next comma outside of angle brackets and
    /// consumes the comma.
    fn take_until_comma(&mut self) -> Vec<TokenTree> {
        let mut res = Vec::new();
        let mut depth = 0usize;
        while let Some(tt) = self.ts.pop() {
            if let TokenTree::Punct(p) = &tt {
                match p.as_char() {
                    ',' if depth == 0 => break,
                    '<' => depth += 1,
                    '>' => depth = depth.saturating_sub(1),
                    _ => (),
                }
            }
            res.push(tt);
        }
        res
    }
}

fn open(delimiter: Delimiter) -> &'static str {
    match delimiter {
        Delimiter::Parenthesis => "(",
        Delimiter::Brace => "{",
        Delimiter::Bracket => "[",
        Delimiter::None => "group",
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    fn parse_command(src: &str) -> String {
        match command(src.parse().unwrap()) {
            Ok(cmd) => format!("{:#?}\n", cmd),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn unquote_literals() {
        assert_eq!(unquote(r#""a \"b\"\n""#).as_deref(), Some("a \"b\"\n"));
        assert_eq!(unquote(r##"r#"raw "x""#"##).as_deref(), Some("raw \"x\""));
        assert_eq!(unquote("'n'").as_deref(), Some("n"));
        assert_eq!(unquote(r#""\u{e9}t\x65""#).as_deref(), Some("\u{e9}te"));
        assert_eq!(unquote("92"), None);
    }

    #[test]
    fn doc_takes_first_paragraph() {
        let lines = ["", " Print a", " report.", "", " Details."].map(String::from);
        assert_eq!(doc_text(&lines).as_deref(), Some("Print a report."));
        assert_eq!(doc_text(&[]), None);
    }

    #[test]
    fn parses_fields_and_attributes() {
        let res = parse_command(
            r#"
/// Run the pipeline.
#[command(name = "full", version = env!("CARGO_PKG_VERSION"))]
pub struct Full {
    /// The file to read
    #[arg]
    pub filename: String,
    #[arg(help = "Iterations", short = 'n', default = 10)]
    iterations: i64,
    #[arg(choices = [1, 2, 3], default_factory = Vec::new)]
    levels: Vec<i64>,
    #[arg(skip)]
    cache: HashMap<String, String>,
    sub_command: Option<Cmd>,
}
"#,
        );
        expect![[r#"
            Cmd {
                ident: "Full",
                name: Some(
                    "full",
                ),
                doc: Some(
                    "Run the pipeline.",
                ),
                version: Some(
                    "env ! (\"CARGO_PKG_VERSION\")",
                ),
                fields: Some(
                    [
                        Field {
                            ident: "filename",
                            ty: "String",
                            doc: Some(
                                "The file to read",
                            ),
                            kind: Arg(
                                Arg {
                                    help: None,
                                    short: None,
                                    choices: None,
                                    optional: false,
                                    default: None,
                                    count: false,
                                    metavar: None,
                                    completer: None,
                                },
                            ),
                        },
                        Field {
                            ident: "iterations",
                            ty: "i64",
                            doc: None,
                            kind: Arg(
                                Arg {
                                    help: Some(
                                        "Iterations",
                                    ),
                                    short: Some(
                                        "n",
                                    ),
                                    choices: None,
                                    optional: false,
                                    default: Some(
                                        Expr(
                                            "10",
                                        ),
                                    ),
                                    count: false,
                                    metavar: None,
                                    completer: None,
                                },
                            ),
                        },
                        Field {
                            ident: "levels",
                            ty: "Vec < i64 >",
                            doc: None,
                            kind: Arg(
                                Arg {
                                    help: None,
                                    short: None,
                                    choices: Some(
                                        Listed(
                                            "1 , 2 , 3",
                                        ),
                                    ),
                                    optional: false,
                                    default: Some(
                                        Factory(
                                            "Vec :: new",
                                        ),
                                    ),
                                    count: false,
                                    metavar: None,
                                    completer: None,
                                },
                            ),
                        },
                        Field {
                            ident: "cache",
                            ty: "HashMap < String , String >",
                            doc: None,
                            kind: Skip,
                        },
                        Field {
                            ident: "sub_command",
                            ty: "Option < Cmd >",
                            doc: None,
                            kind: SubCommand(
                                "Cmd",
                            ),
                        },
                    ],
                ),
            }
        "#]]
        .assert_eq(&res);
    }

    #[test]
    fn rejects_misuse() {
        let check = |src: &str, expect: expect_test::Expect| expect.assert_eq(&parse_command(src));
        check(
            "struct A { scratch: u32 }",
            expect![[r#"field `scratch` is not a command argument, did you forget `#[arg]`?"#]],
        );
        check("struct A<T> { x: T }", expect![[r#"`A` can't be generic"#]]);
        check("struct A(u32);", expect![[r#"`A` must be a struct with named fields"#]]);
        check(
            "struct A { sub_command: Vec<B> }",
            expect![[r#"`sub_command` must be an `Option` of a `Subcommands` enum"#]],
        );
        check(
            "struct A { #[arg(default = 1, default_factory = f)] x: u32 }",
            expect![[r#"`default` and `default_factory` can't both be given"#]],
        );
        check(
            "struct A { #[arg(hepl = \"x\")] x: u32 }",
            expect![[r#"unknown argument attribute `hepl`"#]],
        );
        check("struct A { #[arg(count = 3)] x: u32 }", expect![[r#"`count` takes no value"#]]);
    }

    #[test]
    fn parses_enums() {
        let subs = subcommands(
            "enum Cmd { Sync(Sync), #[command(name = \"ls\")] ListFiles(crate::List), }"
                .parse()
                .unwrap(),
        )
        .unwrap();
        let names = subs.variants.iter().map(|it| (&*it.ident, it.name.as_deref(), &*it.ty));
        assert_eq!(
            names.collect::<Vec<_>>(),
            [("Sync", None, "Sync"), ("ListFiles", Some("ls"), "crate :: List")]
        );

        let color = choice("pub enum Color { Red, Green = 2, Blue }".parse().unwrap()).unwrap();
        assert_eq!(color.members, ["Red", "Green", "Blue"]);

        let err = choice("enum E { A(u32) }".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "`E::A` has fields, only unit variants can be choices");
        let err = choice("enum E {}".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "`E` has no variants to choose from");
    }
}
