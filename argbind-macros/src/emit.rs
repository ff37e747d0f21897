use std::fmt::Write;

use crate::ast;

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

pub(crate) fn command(cmd: &ast::Cmd) -> String {
    let mut buf = String::new();
    w!(buf, "impl ::argbind::Command for {} {{\n", cmd.ident);

    w!(buf, "fn definition() -> ::argbind::CommandDef {{\n");
    w!(buf, "::argbind::CommandDef::new({:?})", cmd.name());
    if let Some(doc) = &cmd.doc {
        w!(buf, "\n.about({:?})", doc);
    }
    if let Some(version) = &cmd.version {
        w!(buf, "\n.version({})", version);
    }
    for field in cmd.fields.as_deref().unwrap_or_default() {
        emit_member(&mut buf, field);
    }
    if let Some(ty) = cmd.sub_command_ty() {
        w!(buf, "\n.sub_commands(<{} as ::argbind::Subcommands>::registry())", ty);
    }
    w!(buf, "\n}}\n\n");

    w!(buf, "#[allow(unused_mut, unused_variables)]\n");
    w!(
        buf,
        "fn from_instance(mut instance: ::argbind::Instance) -> ::argbind::Result<Self> {{\n"
    );
    match &cmd.fields {
        None => w!(buf, "::core::result::Result::Ok(Self)\n"),
        Some(fields) => {
            w!(buf, "::core::result::Result::Ok(Self {{\n");
            for field in fields {
                w!(buf, "{}: ", field.ident);
                emit_take(&mut buf, field);
                w!(buf, ",\n");
            }
            w!(buf, "}})\n");
        }
    }
    w!(buf, "}}\n");

    w!(buf, "}}\n");
    buf
}

fn emit_member(buf: &mut String, field: &ast::Field) {
    let arg = match &field.kind {
        ast::FieldKind::Arg(it) => it,
        ast::FieldKind::Skip => {
            w!(buf, "\n.member(::argbind::Member::Shared({:?}.to_string()))", field.name());
            return;
        }
        ast::FieldKind::SubCommand(_) => {
            w!(buf, "\n.member(::argbind::Member::SubCommandSlot)");
            return;
        }
    };
    let ty = &field.ty;

    w!(buf, "\n.member(::argbind::Field::of::<{}>({:?})", ty, field.name());
    if let Some(help) = arg.help.as_ref().or(field.doc.as_ref()) {
        w!(buf, ".help({:?})", help);
    }
    if let Some(short) = &arg.short {
        w!(buf, ".short({:?})", short);
    }
    match &arg.choices {
        Some(ast::Choices::Listed(items)) => w!(buf, ".choices_listed([{}])", items),
        Some(ast::Choices::Type(path)) => w!(buf, ".choices_of::<{}>()", path),
        Some(ast::Choices::Expr(expr)) => {
            w!(buf, ".choices(::argbind::Choices::Listed(::argbind::Value::from({})))", expr)
        }
        None => (),
    }
    if arg.optional {
        w!(buf, ".optional()");
    }
    match &arg.default {
        Some(ast::DefaultValue::Trait) => w!(
            buf,
            ".default(<{} as ::argbind::ArgType>::into_value(::core::default::Default::default()))",
            ty
        ),
        Some(ast::DefaultValue::Expr(expr)) => {
            w!(buf, ".default(<{} as ::argbind::ArgType>::into_value({}))", ty, expr)
        }
        Some(ast::DefaultValue::Str(lit)) => w!(
            buf,
            ".default(<{} as ::argbind::ArgType>::into_value(::core::convert::Into::into({})))",
            ty,
            lit
        ),
        Some(ast::DefaultValue::Factory(path)) => w!(
            buf,
            ".default_factory(|| <{} as ::argbind::ArgType>::into_value(({})()))",
            ty,
            path
        ),
        None => (),
    }
    if arg.count {
        w!(buf, ".count()");
    }
    if let Some(metavar) = &arg.metavar {
        w!(buf, ".metavar({:?})", metavar);
    }
    if let Some(completer) = &arg.completer {
        w!(buf, ".completer({})", completer);
    }
    w!(buf, ")");
}

fn emit_take(buf: &mut String, field: &ast::Field) {
    match &field.kind {
        ast::FieldKind::Arg(_) => w!(buf, "instance.take::<{}>({:?})?", field.ty, field.name()),
        ast::FieldKind::Skip => w!(buf, "::core::default::Default::default()"),
        ast::FieldKind::SubCommand(ty) => {
            w!(buf, "match instance.take_sub_command() {{\n");
            w!(
                buf,
                "::core::option::Option::Some((name, it)) => ::core::option::Option::Some(<{} as ::argbind::Subcommands>::from_instance(&name, it)?),\n",
                ty
            );
            w!(buf, "::core::option::Option::None => ::core::option::Option::None,\n");
            w!(buf, "}}");
        }
    }
}

pub(crate) fn subcommands(subs: &ast::Subs) -> String {
    let mut buf = String::new();
    w!(buf, "impl ::argbind::Subcommands for {} {{\n", subs.ident);

    w!(buf, "fn registry() -> ::argbind::Registry {{\n");
    w!(buf, "let mut registry = ::argbind::Registry::new();\n");
    for variant in &subs.variants {
        w!(
            buf,
            "registry.register({:?}, <{} as ::argbind::Command>::definition());\n",
            variant.name(),
            variant.ty
        );
    }
    w!(buf, "registry\n");
    w!(buf, "}}\n\n");

    w!(
        buf,
        "fn from_instance(name: &str, instance: ::argbind::Instance) -> ::argbind::Result<Self> {{\n"
    );
    w!(buf, "match name {{\n");
    for variant in &subs.variants {
        w!(
            buf,
            "{:?} => ::core::result::Result::Ok(Self::{}(<{} as ::argbind::Command>::from_instance(instance)?)),\n",
            variant.name(),
            variant.ident,
            variant.ty
        );
    }
    w!(
        buf,
        "_ => ::core::result::Result::Err(::argbind::Error::InvalidArgument(::std::format!(\"unknown sub-command `{{}}`\", name))),\n"
    );
    w!(buf, "}}\n");
    w!(buf, "}}\n");

    w!(buf, "}}\n");
    buf
}

pub(crate) fn choice(choice: &ast::Choice) -> String {
    let mut buf = String::new();
    let ident = &choice.ident;
    w!(buf, "impl ::argbind::ArgType for {} {{\n", ident);

    w!(buf, "fn type_expr() -> ::argbind::TypeExpr {{\n");
    w!(buf, "::argbind::TypeExpr::Enum(::argbind::EnumType::new({:?}, [", ident);
    for member in &choice.members {
        w!(buf, "{:?}, ", member);
    }
    w!(buf, "]))\n");
    w!(buf, "}}\n\n");

    w!(
        buf,
        "fn from_value(value: ::argbind::Value) -> ::core::result::Result<Self, ::argbind::Mismatch> {{\n"
    );
    w!(buf, "if let ::argbind::Value::Member(it) | ::argbind::Value::Text(it) = &value {{\n");
    w!(buf, "match it.as_str() {{\n");
    for member in &choice.members {
        w!(buf, "{:?} => return ::core::result::Result::Ok(Self::{}),\n", member, member);
    }
    w!(buf, "_ => (),\n");
    w!(buf, "}}\n");
    w!(buf, "}}\n");
    w!(buf, "::core::result::Result::Err(::argbind::Mismatch::new({:?}, value))\n", ident);
    w!(buf, "}}\n\n");

    w!(buf, "fn into_value(self) -> ::argbind::Value {{\n");
    w!(buf, "let name = match self {{\n");
    for member in &choice.members {
        w!(buf, "Self::{} => {:?},\n", member, member);
    }
    w!(buf, "}};\n");
    w!(buf, "::argbind::Value::Member(::std::string::String::from(name))\n");
    w!(buf, "}}\n");

    w!(buf, "}}\n");
    buf
}

pub(crate) fn error(msg: &str) -> String {
    format!("::core::compile_error!({:?});", msg)
}

impl ast::Cmd {
    fn name(&self) -> String {
        match &self.name {
            Some(it) => it.clone(),
            None => self.ident.to_lowercase(),
        }
    }
    fn sub_command_ty(&self) -> Option<&str> {
        self.fields.as_deref().unwrap_or_default().iter().find_map(|it| match &it.kind {
            ast::FieldKind::SubCommand(ty) => Some(ty.as_str()),
            _ => None,
        })
    }
}

impl ast::Field {
    fn name(&self) -> &str {
        self.ident.trim_start_matches("r#")
    }
}

impl ast::SubVariant {
    fn name(&self) -> String {
        match &self.name {
            Some(it) => it.clone(),
            None => kebab(&self.ident),
        }
    }
}

fn kebab(s: &str) -> String {
    let mut res = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                res.push('-');
            }
            res.push(c.to_ascii_lowercase());
        } else {
            res.push(c);
        }
    }
    res
}
