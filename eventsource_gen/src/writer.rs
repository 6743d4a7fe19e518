// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Prints the output model as C# source text.

use crate::strings::WARNING_BANNER;
use crate::syntax::*;
use std::fmt::Write;

const INDENT: &str = "    ";

pub fn render_class(class: &ClassDecl) -> String {
    let mut writer = CSharpWriter::new();
    writer.class(class, true);
    writer.finish()
}

pub fn render_unit(unit: &GeneratedUnit) -> String {
    let mut writer = CSharpWriter::new();
    for using in &unit.usings {
        writer.line(&format!("using {using};"));
    }

    let mut first = unit.usings.is_empty();
    for namespace in &unit.namespaces {
        if !first {
            writer.blank();
        }
        first = false;

        match &namespace.name {
            Some(name) => {
                writer.line(&format!("namespace {name}"));
                writer.open();
                writer.items(&namespace.items);
                writer.close();
            }
            None => writer.items(&namespace.items),
        }
    }
    writer.finish()
}

/// `"text"` with C# escapes.
pub fn csharp_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn render_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Ident(name) => out.push_str(name),
        Expr::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Expr::Str(text) => out.push_str(&csharp_string_literal(text)),
        Expr::Null => out.push_str("null"),
        Expr::Member(target, name) => {
            write_operand(out, target);
            out.push('.');
            out.push_str(name);
        }
        Expr::Call(target, args) => {
            write_operand(out, target);
            write_args(out, args);
        }
        Expr::Cast(ty, value) => {
            let _ = write!(out, "({ty})");
            write_operand(out, value);
        }
        Expr::AddressOf(value) => {
            out.push('&');
            write_operand(out, value);
        }
        Expr::Index(target, index) => {
            write_operand(out, target);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        Expr::Binary(left, op, right) => {
            write_expr(out, left);
            let _ = write!(out, " {} ", op.token());
            write_expr(out, right);
        }
        Expr::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
        Expr::StackAlloc(ty, count) => {
            let _ = write!(out, "stackalloc {ty}[");
            write_expr(out, count);
            out.push(']');
        }
        Expr::NewArray(ty, count) => {
            let _ = write!(out, "new {ty}[");
            write_expr(out, count);
            out.push(']');
        }
        Expr::New(ty, args) => {
            let _ = write!(out, "new {ty}");
            write_args(out, args);
        }
        Expr::Verbatim(text) => out.push_str(text),
    }
}

/// Operands of postfix and prefix operators need parentheses unless primary.
fn write_operand(out: &mut String, expr: &Expr) {
    if matches!(
        expr,
        Expr::Binary(..) | Expr::Cast(..) | Expr::AddressOf(..) | Expr::StackAlloc(..)
    ) {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

fn write_args(out: &mut String, args: &[Expr]) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i != 0 {
            out.push_str(", ");
        }
        write_expr(out, arg);
    }
    out.push(')');
}

fn attribute_text(attribute: &AttributeSpec) -> String {
    let mut out = format!("[{}", attribute.name);
    if !attribute.arguments.is_empty() {
        out.push('(');
        for (i, arg) in attribute.arguments.iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            if let Some(name) = &arg.name {
                let _ = write!(out, "{name} = ");
            }
            out.push_str(&arg.value);
        }
        out.push(')');
    }
    out.push(']');
    out
}

fn modifiers_text(accessibility: crate::model::Accessibility, modifiers: &[Modifier]) -> String {
    let mut out = accessibility.keyword().to_owned();
    for modifier in modifiers {
        out.push(' ');
        out.push_str(modifier.keyword());
    }
    out
}

struct CSharpWriter {
    out: String,
    depth: usize,
}

impl CSharpWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn banner(&mut self) {
        for line in WARNING_BANNER {
            self.line(line);
        }
    }

    fn attributes(&mut self, attributes: &[AttributeSpec]) {
        for attribute in attributes {
            self.line(&attribute_text(attribute));
        }
    }

    fn items(&mut self, items: &[UnitItem]) {
        for (i, item) in items.iter().enumerate() {
            if i != 0 {
                self.blank();
            }
            match item {
                UnitItem::Class(class) => self.class(class, true),
                UnitItem::Failure {
                    template_name,
                    diagnostics,
                } => {
                    self.line(&format!("// Generation of {template_name} failed."));
                    for directive in diagnostics.clone().into_failure_marker().lines() {
                        self.line(directive);
                    }
                }
            }
        }
    }

    fn class(&mut self, class: &ClassDecl, banner: bool) {
        if banner {
            self.banner();
        }
        self.attributes(&class.attributes);

        let mut header = format!(
            "{} class {}",
            modifiers_text(class.accessibility, &class.modifiers),
            class.name
        );
        if let Some(base) = &class.base_type {
            let _ = write!(header, " : {base}");
        }
        self.line(&header);

        self.open();
        // Members of nested classes are not bannered.
        self.members(&class.members, banner && class.base_type.is_some());
        self.close();
    }

    fn members(&mut self, members: &[Member], banner: bool) {
        for (i, member) in members.iter().enumerate() {
            if i != 0 {
                self.blank();
            }
            self.member(member, banner);
        }
    }

    fn member(&mut self, member: &Member, banner: bool) {
        match member {
            Member::Region(region) => {
                self.line(&format!("#region {}", region.name));
                self.blank();
                self.members(&region.members, banner);
                self.blank();
                self.line("#endregion");
            }
            Member::Class(class) => self.class(class, banner),
            Member::Field(field) => {
                if banner {
                    self.banner();
                }
                let mut text = format!(
                    "{} {} {}",
                    modifiers_text(field.accessibility, &field.modifiers),
                    field.ty,
                    field.name
                );
                if let Some(init) = &field.init {
                    text.push_str(" = ");
                    write_expr(&mut text, init);
                }
                text.push(';');
                self.line(&text);
            }
            Member::Property(property) => {
                if banner {
                    self.banner();
                }
                self.line(&format!(
                    "{} {} {}",
                    modifiers_text(property.accessibility, &property.modifiers),
                    property.ty,
                    property.name
                ));
                self.open();
                self.line("get");
                self.block(&property.getter);
                self.close();
            }
            Member::Method(method) => {
                if banner {
                    self.banner();
                }
                self.attributes(&method.attributes);
                let mut signature = format!(
                    "{} {} {}(",
                    modifiers_text(method.accessibility, &method.modifiers),
                    method.return_type,
                    method.name
                );
                for (i, parameter) in method.parameters.iter().enumerate() {
                    if i != 0 {
                        signature.push_str(", ");
                    }
                    let _ = write!(signature, "{} {}", parameter.ty, parameter.name);
                }
                signature.push(')');
                self.line(&signature);
                self.block(&method.body);
            }
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.open();
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.close();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.line(&format!("{};", render_expr(expr))),
            Stmt::If { condition, then } => {
                self.line(&format!("if ({})", render_expr(condition)));
                self.block(then);
            }
            Stmt::Assign { target, value } => {
                self.line(&format!("{} = {};", render_expr(target), render_expr(value)))
            }
            Stmt::Local { ty, name, init } => {
                self.line(&format!("{ty} {name} = {};", render_expr(init)))
            }
            Stmt::Fixed {
                ty,
                name,
                init,
                body,
            } => {
                self.line(&format!("fixed ({ty} {name} = {})", render_expr(init)));
                self.block(body);
            }
            Stmt::Return(expr) => self.line(&format!("return {};", render_expr(expr))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KnownType, TypeRef};
    use crate::tree::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expressions() {
        assert_eq!(
            render_expr(&address_of_as_intptr(ident("length1"))),
            "(System.IntPtr)(&length1)"
        );
        assert_eq!(
            render_expr(&descriptor_field(3, "Size")),
            "descrs[3].Size"
        );
        assert_eq!(
            render_expr(&binary(
                Expr::Paren(Box::new(binary(
                    member(ident("arg0"), "Length"),
                    BinaryOp::Add,
                    Expr::Int(1)
                ))),
                BinaryOp::Mul,
                Expr::Int(2)
            )),
            "(arg0.Length + 1) * 2"
        );
        assert_eq!(
            render_expr(&Expr::StackAlloc(TypeRef::named("EventData"), Box::new(Expr::Int(3)))),
            "stackalloc EventData[3]"
        );
        assert_eq!(
            render_expr(&Expr::NewArray(TypeRef::known(KnownType::Byte), Box::new(Expr::Int(0)))),
            "new byte[0]"
        );
        assert_eq!(
            render_expr(&call(member(ident("d"), "ToString"), vec![Expr::Str("c".into())])),
            "d.ToString(\"c\")"
        );
    }

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(csharp_string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(csharp_string_literal("\u{1}"), "\"\\u0001\"");
    }

    #[test]
    fn statements_nest() {
        let method = MethodDecl {
            attributes: vec![AttributeSpec::new("NonEvent")],
            accessibility: crate::model::Accessibility::Private,
            modifiers: vec![Modifier::Unsafe],
            return_type: TypeRef::default(),
            name: "WriteEvent".to_owned(),
            parameters: vec![ParamDecl::new(TypeRef::known(KnownType::String), "arg0")],
            body: vec![
                null_default("arg0", member(ident("string"), "Empty")),
                Stmt::Fixed {
                    ty: TypeRef::pointer_to(TypeRef::known(KnownType::Char)),
                    name: "str0".to_owned(),
                    init: ident("arg0"),
                    body: vec![Stmt::Return(Expr::Null)],
                },
            ],
        };
        let class = ClassDecl {
            attributes: Vec::new(),
            accessibility: crate::model::Accessibility::Public,
            modifiers: vec![Modifier::Static],
            name: "Holder".to_owned(),
            base_type: None,
            members: vec![Member::Method(method)],
        };

        assert_eq!(
            render_class(&class),
            indoc::indoc! {r#"
                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                public static class Holder
                {
                    [NonEvent]
                    private unsafe void WriteEvent(string arg0)
                    {
                        if (arg0 == null)
                        {
                            arg0 = string.Empty;
                        }
                        fixed (char* str0 = arg0)
                        {
                            return null;
                        }
                    }
                }
            "#}
        );
    }
}
