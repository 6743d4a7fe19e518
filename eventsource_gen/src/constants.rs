// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Collection of symbolic keyword/opcode/task constants referenced from event
//! annotations.

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::host::{ClassificationKind, SemanticHost, TracingBase};
use crate::model::AttributeArgument;
use crate::parser::ParsedExpr;
use core::ops::Range;
use indexmap::IndexMap;
use quote::ToTokens;
use syn::{BinOp, Expr, Member};

/// Constants hoisted into the generated class's nested classes.
/// Entries keep first-seen order; the first occurrence of a name wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstantsCollection {
    pub keywords: IndexMap<String, String>,
    pub opcodes: IndexMap<String, String>,
    pub tasks: IndexMap<String, String>,
}

impl ConstantsCollection {
    pub fn table(&self, kind: ClassificationKind) -> &IndexMap<String, String> {
        match kind {
            ClassificationKind::Keywords => &self.keywords,
            ClassificationKind::Opcode => &self.opcodes,
            ClassificationKind::Task => &self.tasks,
        }
    }

    fn table_mut(&mut self, kind: ClassificationKind) -> &mut IndexMap<String, String> {
        match kind {
            ClassificationKind::Keywords => &mut self.keywords,
            ClassificationKind::Opcode => &mut self.opcodes,
            ClassificationKind::Task => &mut self.tasks,
        }
    }

    /// Returns true if `name` was not yet present.
    pub fn insert(&mut self, kind: ClassificationKind, name: &str, expression: &str) -> bool {
        let table = self.table_mut(kind);
        if table.contains_key(name) {
            return false;
        }
        table.insert(name.to_owned(), expression.to_owned());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.opcodes.is_empty() && self.tasks.is_empty()
    }
}

/// A `Receiver.Name` leaf found in a classification expression.
struct MemberAccess {
    name: String,
    receiver: String,
    text: String,
    range: Option<Range<usize>>,
}

pub struct ConstantExpressionCollector<'h> {
    host: &'h dyn SemanticHost,
    base: TracingBase,
}

impl<'h> ConstantExpressionCollector<'h> {
    pub fn new(host: &'h dyn SemanticHost, base: TracingBase) -> Self {
        Self { host, base }
    }

    /// Records every member access in `argument` whose receiver is not the
    /// base's predefined classification enum, and returns the argument text
    /// with those accesses pointing at the generated nested class.
    pub fn collect(
        &self,
        kind: ClassificationKind,
        argument: &AttributeArgument,
        constants: &mut ConstantsCollection,
    ) -> Result<String, Diagnostic> {
        let parsed = ParsedExpr::parse(&argument.expression, argument.location)?;

        let mut accesses = Vec::new();
        visit(&parsed, &parsed.expr, &mut accesses)?;

        let mut edits = Vec::new();
        for access in accesses {
            let predefined = self
                .host
                .receiver_type(self.base, &access.receiver)
                .is_some_and(|ty| self.host.is_classification_type(self.base, kind, &ty));
            if predefined {
                continue;
            }

            if constants.insert(kind, &access.name, &access.text) {
                log::debug!(
                    "hoisting {} `{}` into {}",
                    kind.argument_name(),
                    access.text,
                    kind.class_name()
                );
            }

            // Only the access that defined the constant may be redirected.
            if constants.table(kind).get(&access.name) == Some(&access.text) {
                if let Some(range) = access.range {
                    edits.push((range, format!("{}.{}", kind.class_name(), access.name)));
                }
            }
        }

        Ok(parsed.rewrite(edits))
    }
}

fn visit(
    parsed: &ParsedExpr<'_>,
    expr: &Expr,
    accesses: &mut Vec<MemberAccess>,
) -> Result<(), Diagnostic> {
    match expr {
        Expr::Paren(paren) => visit(parsed, &paren.expr, accesses),
        Expr::Group(group) => visit(parsed, &group.expr, accesses),
        Expr::Binary(binary) => {
            match binary.op {
                BinOp::BitAnd(_) | BinOp::BitOr(_) | BinOp::BitXor(_) | BinOp::Add(_) => {}
                op => {
                    return Err(unsupported(
                        parsed,
                        expr,
                        format!(
                            "Unsupported binary expression `{}` in `{}`. Only bitwise OR, AND, XOR and addition is allowed.",
                            op.to_token_stream(),
                            parsed.source().trim()
                        ),
                    ))
                }
            }
            visit(parsed, &binary.left, accesses)?;
            visit(parsed, &binary.right, accesses)
        }
        Expr::Lit(_) => Ok(()),
        Expr::Field(field) => {
            let Member::Named(name) = &field.member else {
                return Err(unsupported_node(parsed, expr, "tuple member access"));
            };
            if !is_simple_receiver(&field.base) {
                return Err(unsupported_node(parsed, expr, "complex member access"));
            }
            accesses.push(MemberAccess {
                name: name.to_string(),
                receiver: parsed.text_of(&*field.base),
                text: parsed.text_of(expr),
                range: parsed.range_of(expr),
            });
            Ok(())
        }
        _ => Err(unsupported_node(parsed, expr, node_kind(expr))),
    }
}

/// `A`, `A.B`, `alias::A.B`: a name, possibly qualified. The root may carry
/// an alias qualifier such as `global::`.
fn is_simple_receiver(expr: &Expr) -> bool {
    match expr {
        Expr::Path(path) => {
            path.qself.is_none()
                && path.path.leading_colon.is_none()
                && matches!(path.path.segments.len(), 1 | 2)
                && path
                    .path
                    .segments
                    .iter()
                    .all(|segment| segment.arguments.is_empty())
        }
        Expr::Field(field) => {
            matches!(field.member, Member::Named(_)) && is_simple_receiver(&field.base)
        }
        _ => false,
    }
}

fn node_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Call(_) => "method call",
        Expr::MethodCall(_) => "method call",
        Expr::Unary(_) => "unary expression",
        Expr::Path(_) => "identifier name",
        Expr::Cast(_) => "cast",
        Expr::Index(_) => "element access",
        Expr::If(_) | Expr::Match(_) => "conditional",
        Expr::Try(_) => "conditional",
        Expr::Assign(_) | Expr::AssignOp(_) => "assignment",
        Expr::Array(_) => "array creation",
        Expr::Tuple(_) => "tuple",
        Expr::Reference(_) => "address-of expression",
        Expr::Macro(_) => "macro",
        _ => "expression",
    }
}

fn unsupported_node(parsed: &ParsedExpr<'_>, expr: &Expr, kind: &str) -> Diagnostic {
    unsupported(
        parsed,
        expr,
        format!(
            "Unsupported node {} `{}` found in enum assignment expression.",
            kind,
            parsed.text_of(expr)
        ),
    )
}

fn unsupported(parsed: &ParsedExpr<'_>, expr: &Expr, message: String) -> Diagnostic {
    let location = expr
        .to_token_stream()
        .into_iter()
        .next()
        .and_then(|tt| parsed.location_of(tt.span()));
    Diagnostic::new(DiagnosticKind::UnsupportedExpressionForm, location, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostDescription;
    use crate::model::{Location, TypeRef};

    fn host() -> HostDescription {
        HostDescription::default()
            .with_receiver("ExternalFlags", TypeRef::enumeration("Acme.ExternalFlags"))
            .with_receiver("Acme.Ops", TypeRef::enumeration("Acme.Ops"))
    }

    fn collect(
        kind: ClassificationKind,
        expression: &str,
        constants: &mut ConstantsCollection,
    ) -> Result<String, Diagnostic> {
        let host = host();
        let collector = ConstantExpressionCollector::new(&host, TracingBase::System);
        collector.collect(
            kind,
            &AttributeArgument::named(kind.argument_name(), expression, None)
                .at(Location::new(4, 30)),
            constants,
        )
    }

    #[test]
    fn external_members_are_hoisted() {
        let mut constants = ConstantsCollection::default();
        let rewritten = collect(
            ClassificationKind::Keywords,
            "EventKeywords.None | ExternalFlags.X",
            &mut constants,
        )
        .unwrap();

        assert_eq!(rewritten, "EventKeywords.None | Keywords.X");
        assert_eq!(constants.keywords.len(), 1);
        assert_eq!(constants.keywords["X"], "ExternalFlags.X");
        assert!(constants.opcodes.is_empty());
    }

    #[test]
    fn predefined_members_are_not_hoisted() {
        let mut constants = ConstantsCollection::default();
        let rewritten = collect(
            ClassificationKind::Keywords,
            "(System.Diagnostics.Tracing.EventKeywords.AuditFailure & EventKeywords.None) + 0x10",
            &mut constants,
        )
        .unwrap();

        assert_eq!(
            rewritten,
            "(System.Diagnostics.Tracing.EventKeywords.AuditFailure & EventKeywords.None) + 0x10"
        );
        assert!(constants.is_empty());
    }

    #[test]
    fn alias_qualified_receivers() {
        let mut constants = ConstantsCollection::default();
        let rewritten = collect(
            ClassificationKind::Keywords,
            "global::Acme.Flags.Disk | global::System.Diagnostics.Tracing.EventKeywords.None",
            &mut constants,
        )
        .unwrap();

        assert_eq!(
            rewritten,
            "Keywords.Disk | global::System.Diagnostics.Tracing.EventKeywords.None"
        );
        assert_eq!(constants.keywords["Disk"], "global::Acme.Flags.Disk");

        let err = collect(ClassificationKind::Keywords, "a::b::C.D", &mut constants).unwrap_err();
        assert!(err.message.contains("complex member access"), "{}", err.message);
    }

    #[test]
    fn first_occurrence_wins() {
        let mut constants = ConstantsCollection::default();
        collect(ClassificationKind::Opcode, "Acme.Ops.Begin", &mut constants).unwrap();
        let rewritten =
            collect(ClassificationKind::Opcode, "ExternalFlags.Begin", &mut constants).unwrap();

        assert_eq!(constants.opcodes["Begin"], "Acme.Ops.Begin");
        assert_eq!(rewritten, "ExternalFlags.Begin");
    }

    #[test]
    fn predefined_type_depends_on_classification() {
        // EventOpcode is not the keywords type, so it is hoisted.
        let mut constants = ConstantsCollection::default();
        collect(ClassificationKind::Keywords, "EventOpcode.Info", &mut constants).unwrap();
        assert_eq!(constants.keywords["Info"], "EventOpcode.Info");
    }

    #[test]
    fn unsupported_nodes_are_rejected() {
        for (expression, needle) in [
            ("GetFlags()", "method call"),
            ("-ExternalFlags.X", "unary expression"),
            ("ExternalFlags.X - 1", "`-`"),
            ("X", "identifier name"),
            ("Flags.Get().X", "complex member access"),
        ] {
            let mut constants = ConstantsCollection::default();
            let err = collect(ClassificationKind::Task, expression, &mut constants).unwrap_err();
            assert_eq!(err.kind, DiagnosticKind::UnsupportedExpressionForm);
            assert!(err.message.contains(needle), "{expression}: {}", err.message);
            assert_eq!(err.location.map(|l| l.line), Some(4));
        }
    }

    #[test]
    fn unsupported_node_location_is_mapped() {
        let mut constants = ConstantsCollection::default();
        let err = collect(
            ClassificationKind::Task,
            "ExternalFlags.X | Compute()",
            &mut constants,
        )
        .unwrap_err();
        assert_eq!(err.location, Some(Location::new(4, 48)));
    }
}
